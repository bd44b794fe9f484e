//! Prefecture-name canonicalization.
//!
//! Stored profile/group rows carry free-text prefecture values written over
//! several schema generations; some rows have the full canonical name
//! ("東京都"), some the suffix-stripped form ("東京"). `match_values` yields
//! every stored variant for a canonical name and `normalize` maps any stored
//! variant back to its canonical name via a reverse index built once.
//! Unknown input passes through unchanged so legacy rows never drop out of
//! aggregate counts.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const PREFECTURES: [&str; 47] = [
    "北海道",
    "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県",
    "岐阜県", "静岡県", "愛知県", "三重県",
    "滋賀県", "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県",
    "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県",
    "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県",
    "沖縄県",
];

/// All stored string variants for a canonical prefecture name: the name
/// itself plus, for 府/都/県 endings, the suffix-stripped form. 北海道 has no
/// variant. Unknown input is returned as-is.
pub fn match_values(canonical: &str) -> Vec<&str> {
    for suffix in ['府', '都', '県'] {
        if let Some(short) = canonical.strip_suffix(suffix) {
            return vec![canonical, short];
        }
    }
    vec![canonical]
}

fn reverse_index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for canonical in PREFECTURES {
            for variant in match_values(canonical) {
                index.insert(variant, canonical);
            }
        }
        index
    })
}

/// Canonical name for any stored variant; fail-open for unmapped input.
pub fn normalize(stored: &str) -> &str {
    reverse_index().get(stored).copied().unwrap_or(stored)
}
