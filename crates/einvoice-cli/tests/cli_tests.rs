use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!(
        "{}/../einvoice/tests/fixtures/valid/{name}",
        env!("CARGO_MANIFEST_DIR")
    )
}

#[test]
fn test_raw_mapping_output() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.arg(fixture("invoice_envelope.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Invoice\""))
        .stdout(predicate::str::contains("\"InvoiceLine\""))
        .stdout(predicate::str::contains("6489/JP2/8"));
    Ok(())
}

#[test]
fn test_flatten_output() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.arg(fixture("invoice_envelope.xml"))
        .arg("--flatten")
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"supplier\""))
        .stdout(predicate::str::contains("\"payment_model\": \"HR01\""));
    Ok(())
}

#[test]
fn test_credit_note_kind() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.arg(fixture("credit_note_envelope.xml"))
        .arg("--kind")
        .arg("credit-note")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"CreditNote\""));
    Ok(())
}

#[test]
fn test_stdin_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.write_stdin("<InvoiceEnvelope><Invoice><ID>1</ID></Invoice></InvoiceEnvelope>")
        .assert()
        .success()
        .stdout(predicate::str::contains("{\"Invoice\":{\"ID\":\"1\"}}"));
    Ok(())
}

#[test]
fn test_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let out_path = dir.path().join("mapping.json");

    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.arg(fixture("minimal.xml"))
        .arg("--output")
        .arg(&out_path)
        .assert()
        .success();

    let written = std::fs::read_to_string(&out_path)?;
    assert!(written.contains("\"Invoice\""));
    Ok(())
}

#[test]
fn test_missing_envelope_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.write_stdin("<Response><NoEnvelopeHere/></Response>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvoiceEnvelope"));
    Ok(())
}

#[test]
fn test_malformed_xml_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("einvoice")?;
    cmd.write_stdin("<InvoiceEnvelope><Invoice>")
        .assert()
        .failure();
    Ok(())
}
