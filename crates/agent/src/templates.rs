use quotedraft_core::{Language, QuoteDraftPayload};
use rust_decimal::Decimal;
use tera::{Context, Tera};

const ENGLISH_TEMPLATE: &str = "draft_en.txt";
const ARABIC_TEMPLATE: &str = "draft_ar.txt";

/// Deterministic email drafts rendered from the embedded Tera templates.
#[derive(Clone, Debug)]
pub struct TemplateDrafter {
    tera: Tera,
}

impl TemplateDrafter {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (ENGLISH_TEMPLATE, include_str!("../templates/draft_en.txt.tera")),
            (ARABIC_TEMPLATE, include_str!("../templates/draft_ar.txt.tera")),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, payload: &QuoteDraftPayload) -> tera::Result<String> {
        let request = &payload.request;
        let template = match request.client.lang {
            Language::Ar => ARABIC_TEMPLATE,
            Language::En => ENGLISH_TEMPLATE,
        };

        let mut context = Context::new();
        context.insert("client_name", &request.client.name);
        context.insert("currency", &request.currency);
        context.insert("grand_total", &display_amount(payload.grand_total));
        context.insert("delivery_terms", &request.delivery_terms);
        context.insert("notes", &request.notes());

        let rendered = self.tera.render(template, &context)?;
        Ok(rendered.trim_end().to_string())
    }
}

/// Amount as it appears in the JSON response: trailing zeros dropped, whole
/// numbers keep one decimal (`39643.6`, `35136.0`).
pub fn display_amount(amount: Decimal) -> String {
    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        format!("{normalized}.0")
    } else {
        normalized.to_string()
    }
}
