use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::warn;

use crate::currency::format_inr;
use crate::models::{Client, Firm, Invoice};

/// Service for generating GST invoice files in Markdown and PDF format
pub struct InvoiceDocGenerator {
    output_dir: String,
}

impl InvoiceDocGenerator {
    pub fn new(output_dir: &str) -> Result<Self> {
        // Create the output directory if it doesn't exist
        let path = Path::new(output_dir);
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        Ok(Self {
            output_dir: output_dir.to_string(),
        })
    }

    /// Generate a Markdown invoice file and convert it to PDF using pandoc
    /// if available
    pub fn generate(&self, invoice: &Invoice, firm: &Firm, client: &Client) -> Result<(String, String)> {
        let markdown = self.generate_markdown(invoice, firm, client);

        // Invoice numbers like "KDJ/LHR/24-25/19" are not valid file names
        let stem: String = invoice
            .invoice_number
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();

        let md_path = format!("{}/invoice_{}.md", self.output_dir, stem);
        let pdf_path = format!("{}/invoice_{}.pdf", self.output_dir, stem);

        let mut file = File::create(&md_path)?;
        file.write_all(markdown.as_bytes())?;

        // Try to generate PDF using pandoc
        let pdf_result = Command::new("pandoc")
            .arg(&md_path)
            .arg("-o")
            .arg(&pdf_path)
            .output();

        match pdf_result {
            Ok(output) => {
                if !output.status.success() {
                    let error = String::from_utf8_lossy(&output.stderr);
                    warn!(%error, "pandoc failed, writing markdown copy instead");
                    self.create_markdown_copy(&md_path, &pdf_path)?;
                }
            }
            Err(e) => {
                warn!(error = %e, "pandoc unavailable, writing markdown copy instead");
                self.create_markdown_copy(&md_path, &pdf_path)?;
            }
        }

        Ok((md_path, pdf_path))
    }

    /// Create a copy of the markdown file with .pdf extension as fallback
    fn create_markdown_copy(&self, md_path: &str, pdf_path: &str) -> Result<()> {
        let content = fs::read_to_string(md_path)?;
        let mut file = File::create(pdf_path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Generate Markdown content for the invoice
    fn generate_markdown(&self, invoice: &Invoice, firm: &Firm, client: &Client) -> String {
        let mut content = String::new();

        // Letterhead block
        content.push_str(&format!("# {}\n", firm.name));
        content.push_str(&format!("**{}**\n\n", firm.description));
        content.push_str(&format!("{}\n\n", firm.present_address));
        content.push_str(&format!("Phone: {}\n\n", firm.phone));
        if let Some(gst_number) = &firm.gst_number {
            content.push_str(&format!("GSTIN: {}\n\n", gst_number));
        }
        content.push_str(&format!("{}\n\n", firm.proprietor));
        content.push_str("---\n\n");

        // Invoice header
        content.push_str("# Tax Invoice\n\n");
        content.push_str(&format!("**Invoice #** {}\n\n", invoice.invoice_number));
        content.push_str(&format!(
            "**Date** {}\n\n",
            invoice.invoice_date.format("%d %b %Y")
        ));
        if let Some(sac_code) = &invoice.sac_code {
            content.push_str(&format!("**SAC Code** {}\n\n", sac_code));
        }

        // Billed-to block
        content.push_str("**Billed to**\n\n");
        content.push_str(&format!("{}\n\n", client.name));
        content.push_str(&format!(
            "{}, {} - {}\n\n",
            client.address, client.state, client.pincode
        ));
        if let Some(gst_number) = &client.gst_number {
            content.push_str(&format!("GSTIN: {}\n\n", gst_number));
        }
        content.push_str("---\n\n");

        // Line item
        content.push_str("| Description | Qty | Rate | Amount |\n");
        content.push_str("|---|---:|---:|---:|\n");
        content.push_str(&format!(
            "| {} | {} {} | {} | {} |\n\n",
            invoice.description,
            invoice.quantity,
            invoice.unit,
            format_inr(invoice.rate),
            format_inr(invoice.rate * invoice.quantity),
        ));

        // Tax breakdown
        let half_rate = invoice.gst_rate.percent() / 2.0;
        content.push_str("| | |\n");
        content.push_str("|---|---:|\n");
        content.push_str(&format!(
            "| Taxable Amount | {} |\n",
            format_inr(invoice.taxable_amount)
        ));
        if invoice.cgst_amount != 0.0 || invoice.sgst_amount != 0.0 {
            content.push_str(&format!(
                "| CGST ({half_rate}%) | {} |\n",
                format_inr(invoice.cgst_amount)
            ));
            content.push_str(&format!(
                "| SGST ({half_rate}%) | {} |\n",
                format_inr(invoice.sgst_amount)
            ));
        }
        if invoice.igst_amount != 0.0 {
            content.push_str(&format!(
                "| IGST ({}%) | {} |\n",
                invoice.gst_rate.percent(),
                format_inr(invoice.igst_amount)
            ));
        }
        content.push_str(&format!(
            "| **Grand Total** | **{}** |\n\n",
            format_inr(invoice.grand_total)
        ));
        content.push_str(&format!(
            "Payment status: {}\n\n",
            invoice.payment_status.label()
        ));

        // Bank details
        if firm.account_number.is_some() || firm.ifsc_code.is_some() {
            content.push_str("**Bank details**\n\n");
            if let Some(account_number) = &firm.account_number {
                content.push_str(&format!("Account Number: {}\n\n", account_number));
            }
            if let Some(ifsc_code) = &firm.ifsc_code {
                content.push_str(&format!("IFSC Code: {}\n\n", ifsc_code));
            }
        }

        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use crate::tax::GstRate;
    use chrono::{NaiveDate, Utc};

    fn fixtures() -> (Invoice, Firm, Client) {
        let firm = Firm {
            id: "1".to_string(),
            name: "MAA DURGA ENGINEERING".to_string(),
            description: "MECHANICAL, ELECTRICAL & CIVIL CONTRACTOR".to_string(),
            gst_number: Some("SBINO010243".to_string()),
            permanent_address: "Keonjhar".to_string(),
            present_address: "Jajang, Keonjhar".to_string(),
            phone: "9437240540".to_string(),
            proprietor: "Prop. Jogendra Mahanta".to_string(),
            account_number: Some("30383830248".to_string()),
            ifsc_code: Some("SBIN0010243".to_string()),
            letterhead_type: "template".to_string(),
            letterhead_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let client = Client {
            id: "1".to_string(),
            name: "U.K. ENTERPRISES".to_string(),
            address: "JAROLI, JAJANG".to_string(),
            phone: "9876543210".to_string(),
            email: "uk.enterprises@email.com".to_string(),
            gst_number: Some("GSTIN123456789".to_string()),
            state: "Odisha".to_string(),
            pincode: "758034".to_string(),
            created_at: Utc::now(),
        };
        let invoice = Invoice {
            id: "1".to_string(),
            invoice_number: "KDJ/LHR/24-25/19".to_string(),
            firm_id: "1".to_string(),
            client_id: "1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            description: "SAC(Services)/Total Hour(s)".to_string(),
            sac_code: Some("9954".to_string()),
            rate: 2000.0,
            quantity: 88.9,
            unit: "Hours".to_string(),
            gst_rate: GstRate::Eighteen,
            taxable_amount: 177_800.0,
            cgst_amount: 16_002.0,
            sgst_amount: 16_002.0,
            igst_amount: 0.0,
            grand_total: 209_804.0,
            payment_status: PaymentStatus::Pending,
            paid_amount: 0.0,
            pending_amount: 209_804.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        (invoice, firm, client)
    }

    #[test]
    fn markdown_carries_the_tax_breakdown() {
        let (invoice, firm, client) = fixtures();
        let dir = tempfile::tempdir().unwrap();
        let generator = InvoiceDocGenerator::new(dir.path().to_str().unwrap()).unwrap();

        let markdown = generator.generate_markdown(&invoice, &firm, &client);

        assert!(markdown.contains("# MAA DURGA ENGINEERING"));
        assert!(markdown.contains("GSTIN: SBINO010243"));
        assert!(markdown.contains("U.K. ENTERPRISES"));
        assert!(markdown.contains("CGST (9%) | ₹16,002.00"));
        assert!(markdown.contains("SGST (9%) | ₹16,002.00"));
        assert!(markdown.contains("**₹2,09,804.00**"));
        assert!(!markdown.contains("IGST"));
    }

    #[test]
    fn generated_files_land_in_the_output_dir() {
        let (invoice, firm, client) = fixtures();
        let dir = tempfile::tempdir().unwrap();
        let generator = InvoiceDocGenerator::new(dir.path().to_str().unwrap()).unwrap();

        let (md_path, pdf_path) = generator.generate(&invoice, &firm, &client).unwrap();

        assert!(Path::new(&md_path).exists());
        assert!(Path::new(&pdf_path).exists());
        assert!(md_path.ends_with("invoice_KDJ_LHR_24_25_19.md"));
    }
}
