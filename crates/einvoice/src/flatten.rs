//! Flattening of a parsed envelope mapping into business records
//!
//! Works purely on the [`FieldMap`] produced by [`crate::envelope::parse`];
//! the XML tree is never revisited. Every field is optional and stays
//! `None` when the source element is absent — no defaults are invented
//! and no values are validated here.

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{FieldMap, Value};

/// Kind of envelope document being flattened
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DocumentKind {
    #[default]
    Invoice,
    CreditNote,
}

impl DocumentKind {
    /// Envelope wrapper tag used by the exchange service
    pub const fn envelope_tag(self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceEnvelope",
            Self::CreditNote => "CreditNoteEnvelope",
        }
    }

    const fn line_tag(self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceLine",
            Self::CreditNote => "CreditNoteLine",
        }
    }

    /// Credit note lines carry `CreditedQuantity` instead of
    /// `InvoicedQuantity`; both land in [`LineItem::invoiced_quantity`].
    const fn quantity_tag(self) -> &'static str {
        match self {
            Self::Invoice => "InvoicedQuantity",
            Self::CreditNote => "CreditedQuantity",
        }
    }
}

/// Supplier or customer party record
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Party {
    pub endpoint_id: Option<String>,
    pub identification: Option<String>,
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub company_id: Option<String>,
    pub tax_scheme_code: Option<String>,
    pub registration_name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

/// Document-level invoice header
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Header {
    pub document_reference: Option<String>,
    pub currency: Option<String>,
    pub due_date: Option<String>,
    pub customization_id: Option<String>,
    pub supplier_invoice_id: Option<String>,
    pub tax_amount: Option<String>,
    pub tax_percent: Option<String>,
    pub tax_exemption_reason: Option<String>,
    pub taxable_amount: Option<String>,
    pub iban: Option<String>,
    pub instruction_note: Option<String>,
    pub payment_means_code: Option<String>,
    pub payment_id: Option<String>,
    pub payable_amount: Option<String>,
    pub payment_model: Option<String>,
    pub payment_reference: Option<String>,
}

/// One invoice (or credit note) line
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub invoiced_quantity: Option<String>,
    pub invoiced_amount: Option<String>,
    pub unit_price: Option<String>,
    pub tax_category_id: Option<String>,
    pub tax_percent: Option<String>,
    pub tax_exemption_reason: Option<String>,
    pub tax_scheme_code: Option<String>,
}

/// Flattened view of one envelope document
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlatInvoice {
    pub supplier: Party,
    pub customer: Party,
    pub header: Header,
    pub lines: Vec<LineItem>,
    pub note: Option<String>,
    /// Base64 payload of an attached PDF, whitespace stripped;
    /// decoding is left to the caller
    pub pdf_document: Option<String>,
}

/// Flatten the mapping returned by [`crate::envelope::parse`].
///
/// Expects the single-wrapper-key shape that `parse` produces; anything
/// else is malformed input.
pub fn flatten(map: &FieldMap, kind: DocumentKind) -> Result<FlatInvoice> {
    let body = map
        .values()
        .next()
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed("expected a single wrapper key with an object body"))?;

    let (payment_model, payment_reference) =
        split_payment_id(scalar(body, &["PaymentMeans", "PaymentID"]).as_deref());

    let header = Header {
        document_reference: scalar(body, &["BillingReference", "InvoiceDocumentReference", "ID"])
            .or_else(|| scalar(body, &["InvoiceDocumentReference", "ID"])),
        currency: scalar(body, &["TaxCurrencyCode"]),
        due_date: match kind {
            DocumentKind::Invoice => scalar(body, &["DueDate"]),
            DocumentKind::CreditNote => scalar(body, &["IssueDate"]),
        },
        customization_id: scalar(body, &["CustomizationID"]),
        supplier_invoice_id: scalar(body, &["ID"]),
        tax_amount: scalar(body, &["TaxTotal", "TaxAmount"]),
        tax_percent: scalar(body, &["TaxTotal", "TaxSubtotal", "TaxCategory", "Percent"]),
        tax_exemption_reason: scalar(
            body,
            &["TaxTotal", "TaxSubtotal", "TaxCategory", "TaxExemptionReason"],
        ),
        taxable_amount: scalar(body, &["TaxTotal", "TaxSubtotal", "TaxableAmount"]),
        iban: scalar(body, &["PaymentMeans", "PayeeFinancialAccount", "ID"]),
        instruction_note: scalar(body, &["PaymentMeans", "InstructionNote"]),
        payment_means_code: scalar(body, &["PaymentMeans", "PaymentMeansCode"]),
        payment_id: scalar(body, &["PaymentMeans", "PaymentID"]),
        payable_amount: scalar(body, &["LegalMonetaryTotal", "PayableAmount"]),
        payment_model,
        payment_reference,
    };

    let lines = flatten_lines(body, kind);
    debug!(kind = ?kind, lines = lines.len(), "flattened envelope mapping");

    Ok(FlatInvoice {
        supplier: flatten_party(body, "AccountingSupplierParty"),
        customer: flatten_party(body, "AccountingCustomerParty"),
        header,
        lines,
        note: joined_notes(body),
        pdf_document: embedded_pdf(body),
    })
}

fn flatten_party(body: &FieldMap, role: &str) -> Party {
    let Some(party) = body
        .get(role)
        .and_then(|v| lookup(v, &["Party"]))
        .and_then(Value::as_object)
    else {
        return Party::default();
    };

    Party {
        endpoint_id: scalar(party, &["EndpointID"]),
        identification: scalar(party, &["PartyIdentification", "ID"]),
        name: scalar(party, &["PartyName", "Name"]),
        street: scalar(party, &["PostalAddress", "StreetName"]),
        city: scalar(party, &["PostalAddress", "CityName"]),
        postal_code: scalar(party, &["PostalAddress", "PostalZone"]),
        country_code: scalar(party, &["PostalAddress", "Country", "IdentificationCode"]),
        company_id: scalar(party, &["PartyTaxScheme", "CompanyID"]),
        tax_scheme_code: scalar(party, &["PartyTaxScheme", "TaxScheme", "ID"]),
        registration_name: scalar(party, &["PartyLegalEntity", "RegistrationName"]),
        telephone: scalar(party, &["Contact", "Telephone"]),
        email: scalar(party, &["Contact", "ElectronicMail"]),
    }
}

fn flatten_lines(body: &FieldMap, kind: DocumentKind) -> Vec<LineItem> {
    let Some(lines) = body.get(kind.line_tag()) else {
        return Vec::new();
    };

    lines
        .occurrences()
        .iter()
        .filter_map(Value::as_object)
        .map(|line| flatten_line(line, kind))
        .collect()
}

fn flatten_line(line: &FieldMap, kind: DocumentKind) -> LineItem {
    // The tax category may sit on the item (ClassifiedTaxCategory) or on
    // the line itself (TaxTotal/../TaxCategory); the item-level one wins.
    let item_tax = |field: &str| scalar(line, &["Item", "ClassifiedTaxCategory", field]);
    let line_tax = |field: &str| scalar(line, &["TaxTotal", "TaxSubtotal", "TaxCategory", field]);

    LineItem {
        id: scalar(line, &["ID"]),
        name: scalar(line, &["Item", "Name"]),
        description: scalar(line, &["Item", "Description"]),
        invoiced_quantity: scalar(line, &[kind.quantity_tag()]),
        invoiced_amount: scalar(line, &["LineExtensionAmount"]),
        unit_price: scalar(line, &["Price", "PriceAmount"]),
        tax_category_id: item_tax("ID").or_else(|| line_tax("ID")),
        tax_percent: item_tax("Percent").or_else(|| line_tax("Percent")),
        tax_exemption_reason: item_tax("TaxExemptionReason")
            .or_else(|| line_tax("TaxExemptionReason")),
        tax_scheme_code: scalar(line, &["Item", "ClassifiedTaxCategory", "TaxScheme", "ID"]),
    }
}

/// Multiple `Note` elements are joined with a newline, as downstream
/// systems expect a single free-text field.
fn joined_notes(body: &FieldMap) -> Option<String> {
    let notes = body.get("Note")?;
    let texts: Vec<&str> = notes
        .occurrences()
        .iter()
        .filter_map(Value::as_scalar)
        .filter(|text| !text.is_empty())
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

/// Embedded PDF payload from the first additional document reference
/// that carries one. Chunked transfers arrive with embedded whitespace,
/// which is stripped here.
fn embedded_pdf(body: &FieldMap) -> Option<String> {
    let references = body.get("AdditionalDocumentReference")?;
    references.occurrences().iter().find_map(|reference| {
        let payload = lookup(reference, &["Attachment", "EmbeddedDocumentBinaryObject"])?
            .as_scalar()?;
        if payload.is_empty() {
            return None;
        }
        Some(payload.split_whitespace().collect())
    })
}

/// `PaymentID` packs the payment model into its first four characters;
/// the remainder, leading whitespace stripped, is the reference.
fn split_payment_id(payment_id: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(payment_id) = payment_id else {
        return (None, None);
    };
    let split = payment_id
        .char_indices()
        .nth(4)
        .map_or(payment_id.len(), |(idx, _)| idx);
    let (model, reference) = payment_id.split_at(split);
    (
        Some(model.to_string()),
        Some(reference.trim_start().to_string()),
    )
}

/// Path lookup that tolerates repeated intermediate elements by
/// descending into the first occurrence, mirroring how the exchange
/// service duplicates party blocks.
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        while let Value::List(items) = current {
            current = items.first()?;
        }
        current = current.get(key)?;
    }
    Some(current)
}

fn scalar(map: &FieldMap, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    lookup(map.get(first)?, rest)
        .and_then(Value::as_scalar)
        .map(str::to_string)
}
