//! Keyword tables used to classify listing titles.
//!
//! Each table is an ordered list of `(canonical tag, aliases)`. Order matters:
//! first-match dimensions stop at the first tag whose alias occurs in the
//! lower-cased title, so earlier entries shadow later ones. Aliases are stored
//! lower-case.

/// An ordered tag → aliases table.
pub type Vocabulary = &'static [(&'static str, &'static [&'static str])];

/// Member tag for cards that name no single member.
pub const GROUP_MEMBER: &str = "Group";
pub const UNCLASSIFIED_ALBUM: &str = "unclassified";
pub const GENERAL_TYPE: &str = "general";

pub static MEMBERS: Vocabulary = &[
    ("RM", &["rm", "알엠", "남준", "namjoon"]),
    ("Jin", &["진", "jin", "석진", "seokjin"]),
    ("SUGA", &["슈가", "suga", "윤기", "yoongi", "민윤기"]),
    ("j-hope", &["제이홉", "jhope", "j-hope", "호석", "hoseok", "정호석"]),
    ("Jimin", &["지민", "jimin", "박지민"]),
    ("V", &["뷔", "v", "태형", "taehyung", "김태형"]),
    ("Jung Kook", &["정국", "jungkook", "jk", "전정국"]),
];

pub static ALBUMS: Vocabulary = &[
    ("PROOF", &["proof", "프루프"]),
    ("MAP OF THE SOUL: 7", &["mots", "map of the soul", "7", "맵솔"]),
    ("BE", &["be", "비이"]),
    (
        "LOVE YOURSELF",
        &["love yourself", "러브 유어셀프", "러브유어셀프", "ly", "결", "전", "답"],
    ),
    ("WINGS", &["wings", "윙스"]),
    ("YOU NEVER WALK ALONE", &["you never walk alone", "ynwa"]),
    ("THE MOST BEAUTIFUL MOMENT IN LIFE", &["hyyh", "화양연화", "화연"]),
    ("DARK & WILD", &["dark", "wild", "다크"]),
    ("Butter", &["butter", "버터"]),
    ("Dynamite", &["dynamite", "다이너마이트"]),
    ("Permission to Dance", &["ptd", "permission"]),
    ("Life Goes On", &["lgo", "life goes on"]),
    ("ON", &["on", "온"]),
    ("Black Swan", &["black swan", "블랙스완"]),
    ("Boy With Luv", &["bwl", "boy with luv", "작은것들"]),
    ("IDOL", &["idol", "아이돌"]),
    ("DNA", &["dna"]),
    ("MIC Drop", &["mic drop", "마이크드랍"]),
    ("Spring Day", &["spring day", "봄날"]),
    ("Blood Sweat & Tears", &["bst", "blood sweat", "피땀눈물"]),
];

pub static CARD_TYPES: Vocabulary = &[
    ("Lucky Draw", &["럭드", "럭키드로우", "lucky draw"]),
    ("Weverse", &["위버스", "weverse"]),
    ("Official", &["공포", "공식포토"]),
    ("Unofficial", &["비공포", "비공식포토"]),
    ("Unreleased", &["미공포", "미공식포토"]),
    ("Signed", &["시그", "사인", "sign"]),
    ("Pre-order", &["예판", "예약판매"]),
    ("Fan Sign", &["팬싸", "팬사인회"]),
    ("Album", &["앨포", "앨범포토"]),
    ("Trading Card", &["트포", "트레카"]),
    ("Mini", &["미니포토"]),
];

/// Display order for member sections; whole-group cards go last.
pub const MEMBER_ORDER: &[&str] = &[
    "RM",
    "Jin",
    "SUGA",
    "j-hope",
    "Jimin",
    "V",
    "Jung Kook",
    GROUP_MEMBER,
];

/// Display order for type filters.
pub const TYPE_ORDER: &[&str] = &[
    GENERAL_TYPE,
    "Album",
    "Pre-order",
    "Unreleased",
    "Official",
    "Weverse",
    "Lucky Draw",
    "Signed",
    "Fan Sign",
    "Trading Card",
    "Mini",
    "Unofficial",
];

/// Korean marketplace label for a type tag, for Korean-locale consumers.
pub fn korean_type_label(tag: &str) -> Option<&'static str> {
    let label = match tag {
        GENERAL_TYPE => "일반포카",
        "Album" => "앨포",
        "Pre-order" => "예판포",
        "Unreleased" => "미공포",
        "Official" => "공포",
        "Weverse" => "위버스포",
        "Lucky Draw" => "럭드포",
        "Signed" => "시그포",
        "Fan Sign" => "팬싸포",
        "Trading Card" => "트포",
        "Mini" => "미니포",
        "Unofficial" => "비공포",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_lower_case() {
        for table in [MEMBERS, ALBUMS, CARD_TYPES] {
            for (tag, aliases) in table {
                for alias in *aliases {
                    assert_eq!(*alias, alias.to_lowercase(), "alias of {tag}");
                }
            }
        }
    }

    #[test]
    fn display_orders_cover_every_tag() {
        for (tag, _) in MEMBERS {
            assert!(MEMBER_ORDER.contains(tag), "{tag} missing from MEMBER_ORDER");
        }
        for (tag, _) in CARD_TYPES {
            assert!(TYPE_ORDER.contains(tag), "{tag} missing from TYPE_ORDER");
            assert!(korean_type_label(tag).is_some());
        }
    }
}
