//! Legal-document attributes served by the `LoadLuocDo.aspx` endpoint
//!
//! The endpoint returns an HTML fragment:
//!
//! ```html
//! <div class="tt">Nghị định 30/2020/NĐ-CP về công tác văn thư</div>
//! <div class="att"><div class="hd fl">Số hiệu:</div><div class="ds fl">30/2020/NĐ-CP</div></div>
//! ...
//! <div class="tt" style="font-weight: normal">Ghi chú</div>
//! ```
//!
//! Raw keys are the Vietnamese labels; [`normalize_attributes`] maps them
//! onto the fixed [`DocumentAttributes`] schema.

use crate::extract::content::element_text;
use crate::extract::ExtractError;
use crate::model::DocumentAttributes;
use scraper::{Html, Selector};
use std::collections::HashMap;

/// Raw attribute mapping keyed by source-language label
pub type RawAttributes = HashMap<String, String>;

pub const KEY_DESCRIPTION: &str = "Mô tả";
pub const KEY_NOTE: &str = "Ghi chú";
pub const KEY_OFFICIAL_NUMBER: &str = "Số hiệu";
pub const KEY_STATUS: &str = "Tình trạng";
pub const KEY_ISSUING_BODY: &str = "Nơi ban hành";
pub const KEY_SIGNER: &str = "Người ký";
pub const KEY_DOCUMENT_TYPE: &str = "Loại văn bản";
pub const KEY_FIELD: &str = "Lĩnh vực, ngành";
pub const KEY_ISSUED_DATE: &str = "Ngày ban hành";
pub const KEY_EFFECTIVE_DATE: &str = "Ngày hiệu lực";
pub const KEY_POSTED_DATE: &str = "Ngày đăng";

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css)
        .map_err(|e| ExtractError::MalformedAttributes(format!("selector '{}': {:?}", css, e)))
}

/// Parses the attribute fragment into a raw label → value mapping
///
/// The leading `div.tt` (description) is required; a fragment without it
/// is not an attribute block. Rows missing their label or value are skipped.
pub fn parse_attribute_fragment(html: &str) -> Result<RawAttributes, ExtractError> {
    let fragment = Html::parse_fragment(html);
    let mut attributes = RawAttributes::new();

    let description = fragment
        .select(&selector("div.tt")?)
        .next()
        .ok_or_else(|| ExtractError::MalformedAttributes("missing div.tt description".to_string()))?;
    attributes.insert(KEY_DESCRIPTION.to_string(), element_text(&description));

    let label = selector("div.hd.fl")?;
    let value = selector("div.ds.fl")?;
    for row in fragment.select(&selector("div.att")?) {
        let (Some(name), Some(content)) = (row.select(&label).next(), row.select(&value).next())
        else {
            tracing::debug!("Skipping attribute row without label/value");
            continue;
        };
        let name = element_text(&name).replace(':', "");
        attributes.insert(name.trim().to_string(), element_text(&content));
    }

    if let Some(note) = fragment
        .select(&selector(r#"div.tt[style="font-weight: normal"]"#)?)
        .next()
    {
        attributes.insert(KEY_NOTE.to_string(), element_text(&note));
    }

    Ok(attributes)
}

/// Maps raw attributes onto the fixed output schema
///
/// Total over its input: every output key is populated, with empty strings
/// standing in for missing raw keys.
pub fn normalize_attributes(raw: &RawAttributes) -> DocumentAttributes {
    let get = |key: &str| raw.get(key).cloned().unwrap_or_default();

    DocumentAttributes {
        official_number: [get(KEY_OFFICIAL_NUMBER)],
        document_info: [
            get(KEY_DESCRIPTION),
            format!("{}: {}", KEY_STATUS, get(KEY_STATUS)),
        ],
        issuing_body_office_signer: [get(KEY_ISSUING_BODY), String::new(), get(KEY_SIGNER)],
        document_type: [get(KEY_DOCUMENT_TYPE)],
        document_field: [get(KEY_FIELD)],
        issued_date: get(KEY_ISSUED_DATE),
        effective_date: get(KEY_EFFECTIVE_DATE),
        enforced_date: get(KEY_POSTED_DATE),
        note: get(KEY_NOTE),
    }
}
