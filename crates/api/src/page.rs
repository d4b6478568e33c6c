//! HTML Page Rendering
//!
//! One page: usage text, the attribute form and a result area. The result
//! area is empty until the form is submitted, then shows either the
//! estimate or a single error message.

use data_validator::ValidationConfig;
use feature_engine::{HouseAttributes, NumericField, RegionCatalog};
use inference_engine::{Estimate, EstimateError};
use std::fmt::Write;

/// Shown under every estimate
pub const DISCLAIMER: &str = "Estimasi ini dihasilkan oleh model machine learning \
    dan bukan penilaian resmi. Harga transaksi sebenarnya dapat berbeda.";

/// What the result area shows
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Awaiting submission
    Pending,
    Estimate(String),
    Error(String),
}

impl Outcome {
    /// Map an estimate attempt to the text shown to the user
    pub fn from_result(result: &Result<Estimate, EstimateError>) -> Self {
        match result {
            Ok(estimate) => Outcome::Estimate(estimate.formatted.clone()),
            Err(EstimateError::RegionUnavailable(region)) => Outcome::Error(format!(
                "Maaf, data untuk kecamatan {} belum tersedia.",
                region
            )),
            Err(EstimateError::UnknownRegion(region)) => {
                Outcome::Error(format!("Kecamatan tidak dikenal: {}", region))
            }
            Err(EstimateError::Invalid(validation)) => {
                Outcome::Error(format!("Input tidak valid: {}", validation.summary()))
            }
            Err(EstimateError::Inference(e)) => Outcome::Error(format!("Terjadi kesalahan: {}", e)),
        }
    }
}

/// Form label of a numeric field
pub fn field_label(field: NumericField) -> &'static str {
    match field {
        NumericField::Bedrooms => "Jumlah Kamar Tidur:",
        NumericField::Bathrooms => "Jumlah Kamar Mandi:",
        NumericField::LandArea => "Luas Tanah (m²):",
        NumericField::BuildingArea => "Luas Bangunan (m²):",
        NumericField::ElectricalPower => "Daya Listrik (Watt):",
        NumericField::Floors => "Jumlah Lantai:",
        NumericField::Carports => "Carport (Jumlah Mobil):",
        NumericField::ServantBedrooms => "Kamar Tidur Pembantu:",
        NumericField::ServantBathrooms => "Kamar Mandi Pembantu:",
    }
}

/// Every selectable region: supported in catalog order, then unsupported
pub fn selectable_regions(catalog: &RegionCatalog) -> Vec<&str> {
    catalog
        .supported()
        .iter()
        .chain(catalog.unsupported())
        .map(String::as_str)
        .collect()
}

/// Escape text for HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full page with `values` pre-filled
pub fn render(
    bounds: &ValidationConfig,
    catalog: &RegionCatalog,
    values: &HouseAttributes,
    outcome: &Outcome,
) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n",
        "<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>Prediksi Harga Rumah</title>\n",
        "<style>",
        "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}",
        ".cols{display:flex;gap:2rem;flex-wrap:wrap}.cols>fieldset{flex:1;min-width:280px}",
        "label{display:block;margin-top:.6rem}input,select{width:100%;padding:.3rem}",
        "button{display:block;margin:1.5rem auto;padding:.6rem 3rem}",
        ".ok{background:#e6f4ea;padding:1rem}.err{background:#fce8e6;padding:1rem}",
        ".note{color:#555;font-size:.9rem}",
        "</style>\n</head>\n<body>\n",
    ));

    html.push_str(concat!(
        "<section id=\"home\">\n",
        "<h1>🏠 Selamat Datang di Aplikasi Prediksi Harga Rumah</h1>\n",
        "<p>Aplikasi ini menggunakan model machine learning untuk memprediksi harga rumah ",
        "berdasarkan fitur seperti jumlah kamar, luas tanah, daya listrik, dan lokasi kecamatan.</p>\n",
        "<ol><li>Isi semua input yang tersedia.</li>",
        "<li>Klik tombol <strong>Prediksi Harga</strong>.</li>",
        "<li>Harga estimasi akan ditampilkan dalam bentuk rupiah.</li></ol>\n",
        "</section>\n",
    ));

    html.push_str("<section id=\"predict\">\n<h2>📊 Prediksi Harga Rumah</h2>\n");
    html.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"cols\">\n");

    let (property, extra) = NumericField::ALL.split_at(4);
    for (legend, fields) in [("🏡 Informasi Properti", property), ("⚡ Spesifikasi Tambahan", extra)] {
        let _ = writeln!(html, "<fieldset><legend>{}</legend>", legend);
        for field in fields {
            render_number_input(&mut html, *field, bounds, values);
        }
        html.push_str("</fieldset>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<label for=\"region\">🏙️ Pilih Kecamatan:</label>\n<select id=\"region\" name=\"region\">\n");
    for region in selectable_regions(catalog) {
        let selected = if region.eq_ignore_ascii_case(values.region.trim()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(region),
            selected
        );
    }
    html.push_str("</select>\n<button type=\"submit\">🔍 Prediksi Harga</button>\n</form>\n");

    match outcome {
        Outcome::Pending => {}
        Outcome::Estimate(formatted) => {
            let _ = write!(
                html,
                "<div id=\"result\" class=\"ok\"><h3>💰 Estimasi Harga Rumah:</h3><p><strong>{}</strong></p><p class=\"note\">{}</p></div>\n",
                escape(formatted),
                DISCLAIMER
            );
        }
        Outcome::Error(message) => {
            let _ = writeln!(
                html,
                "<div id=\"result\" class=\"err\"><p>{}</p></div>",
                escape(message)
            );
        }
    }

    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn render_number_input(
    html: &mut String,
    field: NumericField,
    bounds: &ValidationConfig,
    values: &HouseAttributes,
) {
    let key = field.key();
    let (min, max) = bounds
        .bounds(key)
        .map(|b| (b.min, b.max))
        .unwrap_or((0, u32::MAX));
    let _ = writeln!(
        html,
        "<label for=\"{key}\">{label}</label><input type=\"number\" id=\"{key}\" name=\"{key}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required>",
        key = key,
        label = field_label(field),
        min = min,
        max = max,
        value = field.value(values),
    );
}
