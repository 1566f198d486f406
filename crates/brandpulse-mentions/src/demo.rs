//! Fixed demonstration dataset used when live retrieval finds nothing.

use brandpulse_core::profile::BRAND_PLACEHOLDER;
use chrono::{Duration, NaiveDate};

use crate::types::Document;

pub const DEMO_DOCUMENT_COUNT: usize = 6;

/// `(url, days before today, text template)`; `{brand}` is substituted.
const DEMO_MENTIONS: [(&str, i64, &str); DEMO_DOCUMENT_COUNT] = [
    (
        "https://weibo.com/demo/1001",
        1,
        "Picked up the {brand} last week. Battery life is great and it easily lasts a full day of heavy use.",
    ),
    (
        "https://www.zhihu.com/question/demo/answer/2002",
        2,
        "Long-term review of {brand}: the camera is excellent in daylight but struggles at night. Would still recommend it.",
    ),
    (
        "https://www.bilibili.com/video/demo3003",
        3,
        "Teardown video of {brand}. Build quality is solid, though the charging port feels loose on our unit.",
    ),
    (
        "https://www.xiaohongshu.com/explore/demo4004",
        4,
        "{brand} customer service ignored my screen flicker complaint for two weeks. Very disappointed.",
    ),
    (
        "https://news.sina.com.cn/demo/5005.shtml",
        5,
        "{brand} announces a system update addressing overheating reports from early buyers.",
    ),
    (
        "https://weibo.com/demo/6006",
        6,
        "Comparing {brand} with last year's model: slimmer body, brighter display, same price point.",
    ),
];

/// The demonstration documents for `brand`, dated relative to `today`.
#[must_use]
pub fn demo_documents(brand: &str, today: NaiveDate) -> Vec<Document> {
    DEMO_MENTIONS
        .iter()
        .map(|(url, days_ago, template)| {
            let text = template.replace(BRAND_PLACEHOLDER, brand);
            Document {
                url: (*url).to_string(),
                title: Some(format!("{brand} mention")),
                language: "en".to_string(),
                published: today.checked_sub_signed(Duration::days(*days_ago)),
                text,
            }
        })
        .collect()
}
