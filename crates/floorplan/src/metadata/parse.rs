use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{OcrRoom, ParsedMetadata, round_to};

const NUMBER: &str = r"(\d+[.,]\d+|\d+)";

fn compile(pattern: &str) -> Regex {
    Regex::new(&pattern.replace("{NUM}", NUMBER)).expect("Invalid metadata regex")
}

static SCALE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)масштаб[:\s]*(\d+)[:\s]*:\s*(\d+)"),
        compile(r"(\d+)\s*:\s*(\d+)"),
    ]
});

static APARTMENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)квартир[аы]*\s*№?\s*(\d+)"),
        compile(r"(?i)кв\.?\s*№?\s*(\d+)"),
        compile(r"№\s*(\d+)"),
    ]
});

static FLOOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![compile(r"(?i)(\d+)\s*этаж"), compile(r"(?i)этаж[:\s]*(\d+)")]
});

static ADDRESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)ул\.?\s*[А-ЯЁ][а-яё]+[,\s]+№?\s*\d+"),
        compile(r"(?i)г\.?\s*[А-ЯЁ][а-яё]+[,\s]+(?:ул\.?|улица|пр\.?|проспект)[\sА-ЯЁа-яё\d.,]+"),
        compile(r"(?i)Москва[,\s]+[ А-ЯЁа-яё\d.,]+"),
        compile(r"(?i)Санкт-Петербург[,\s]+[ А-ЯЁа-яё\d.,]+"),
    ]
});

/// Uppercase `H=` is the main ceiling height.
static MAIN_HEIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| compile(r"H\s*[=:]\s*{NUM}"));

static LOCAL_HEIGHT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"h\s*[=:]\s*{NUM}"),
        compile(r"(?i)высота[:\s]+{NUM}\s*м"),
        compile(r"(?i)потол\w*[:\s]+{NUM}\s*м"),
    ]
});

static TOTAL_AREA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)площадь[:\s]+{NUM}\s*м[²2]"),
        compile(r"(?i)общая\s+площадь[:\s]+{NUM}"),
        compile(r"(?i){NUM}\s*м[²2]\s*общая"),
        compile(r"(?i)S\s*общ[ая]*[:\s]+{NUM}"),
    ]
});

/// "22 / 10.9", "22\n10.9", "комната 22 10.9" and "22/10.9".
static ROOM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(\d{1,2})[\s/]+{NUM}"),
        compile(r"(\d{1,2})\s*\n\s*{NUM}"),
        compile(r"(?i)комнат[аы]*\s*(\d+)[\s/]+{NUM}"),
        compile(r"(\d{1,2})/(\d+[.,]\d+)"),
    ]
});

const CEILING_RANGE: (f64, f64) = (2.0, 5.0);
const ROOM_AREA_RANGE: (f64, f64) = (0.5, 100.0);
const TOTAL_AREA_RANGE: (f64, f64) = (10.0, 500.0);
const ADDRESS_MIN_CHARS: usize = 10;

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

fn in_open_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value > lo && value < hi
}

/// Parses free text from OCR or a PDF text layer.
pub fn parse_metadata(text: &str) -> ParsedMetadata {
    let rooms = parse_rooms(text);
    let area = parse_total_area(text).or_else(|| {
        (!rooms.is_empty()).then(|| round_to(rooms.iter().map(|r| r.area).sum(), 1))
    });

    let metadata = ParsedMetadata {
        area,
        address: parse_address(text),
        ceiling_height: parse_ceiling_height(text),
        scale: parse_scale(text),
        apartment_number: first_capture(&APARTMENT_PATTERNS, text),
        floor: first_capture(&FLOOR_PATTERNS, text).and_then(|f| f.parse().ok()),
        rooms,
    };

    tracing::debug!(
        rooms = metadata.rooms.len(),
        scale = ?metadata.scale,
        ceiling_height = ?metadata.ceiling_height,
        "parsed plan metadata"
    );
    metadata
}

/// `N:M` → `N / M`. A labelled "масштаб" notation wins over a bare one.
pub fn parse_scale(text: &str) -> Option<f64> {
    SCALE_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        (den > 0.0).then(|| num / den)
    })
}

/// Prefers the first uppercase `H=` value in range; otherwise the largest
/// in-range value among `h=` and narrative mentions.
pub fn parse_ceiling_height(text: &str) -> Option<f64> {
    let main = MAIN_HEIGHT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| parse_number(&caps[1]))
        .find(|h| in_open_range(*h, CEILING_RANGE));
    if let Some(height) = main {
        return Some(round_to(height, 2));
    }

    LOCAL_HEIGHT_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .filter_map(|caps| parse_number(&caps[1]))
        .filter(|h| in_open_range(*h, CEILING_RANGE))
        .reduce(f64::max)
        .map(|h| round_to(h, 2))
}

pub fn parse_address(text: &str) -> Option<String> {
    ADDRESS_PATTERNS.iter().find_map(|pattern| {
        let found = pattern.find(text)?;
        let candidate = found.as_str().trim();
        let candidate = candidate.strip_prefix("по ").unwrap_or(candidate).trim();
        (candidate.chars().count() > ADDRESS_MIN_CHARS).then(|| candidate.to_string())
    })
}

pub fn parse_total_area(text: &str) -> Option<f64> {
    TOTAL_AREA_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        let area = parse_number(&caps[1])?;
        in_open_range(area, TOTAL_AREA_RANGE).then(|| round_to(area, 1))
    })
}

/// Harvests `number → area` pairs. The first occurrence of a number wins;
/// numbers must be in `1..=99` and areas in `(0.5, 100)` m².
pub fn parse_rooms(text: &str) -> Vec<OcrRoom> {
    let mut found: BTreeMap<u32, f64> = BTreeMap::new();

    for pattern in ROOM_PATTERNS.iter() {
        let mut start = 0;
        while let Some(caps) = pattern.captures_at(text, start) {
            let (Some(whole), Some(number_match)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            // The number must not be the tail of a longer or decimal number.
            let preceded_by_number = text[..number_match.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == ',');
            if preceded_by_number {
                start = number_match.end();
                continue;
            }
            start = whole.end();

            let number: Option<u32> = number_match.as_str().parse().ok();
            let area = parse_number(&caps[2]);
            if let (Some(number), Some(area)) = (number, area) {
                if (1..=99).contains(&number) && in_open_range(area, ROOM_AREA_RANGE) {
                    found.entry(number).or_insert(area);
                }
            }
        }
    }

    found
        .into_iter()
        .map(|(number, area)| OcrRoom { number, area })
        .collect()
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text).map(|caps| caps[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_TEXT: &str = "\
Поэтажный план
г. Краснодар, ул. Старокубанская, 119
Квартира № 45, 3 этаж
Масштаб 1:100
H=2.83
21/18.2
22 / 10.9
23
6.4
h=2.53";

    #[test]
    fn test_full_plan_text() {
        let metadata = parse_metadata(PLAN_TEXT);
        assert_eq!(metadata.scale, Some(0.01));
        assert_eq!(metadata.ceiling_height, Some(2.83));
        assert_eq!(metadata.apartment_number.as_deref(), Some("45"));
        assert_eq!(metadata.floor, Some(3));
        assert_eq!(
            metadata.address.as_deref(),
            Some("ул. Старокубанская, 119")
        );
        assert_eq!(
            metadata.rooms,
            vec![
                OcrRoom { number: 21, area: 18.2 },
                OcrRoom { number: 22, area: 10.9 },
                OcrRoom { number: 23, area: 6.4 },
            ]
        );
        assert_eq!(metadata.area, Some(35.5));
    }

    #[test]
    fn test_empty_text_is_all_none() {
        assert!(parse_metadata("").is_empty());
        assert!(parse_metadata("план квартиры без чисел").is_empty());
    }

    #[test]
    fn test_scale_prefers_labelled_notation() {
        assert_eq!(parse_scale("лист 2:3, масштаб 1:200"), Some(0.005));
        assert_eq!(parse_scale("1 : 50"), Some(0.02));
        assert_eq!(parse_scale("1:0"), None);
    }

    #[test]
    fn test_lowercase_heights_take_maximum() {
        assert_eq!(parse_ceiling_height("h=2.53 h=2,7 высота: 2.6 м"), Some(2.7));
        assert_eq!(parse_ceiling_height("h=12"), None);
        assert_eq!(parse_ceiling_height("H=1.2 h=2.5"), Some(2.5));
    }

    #[test]
    fn test_explicit_total_area_wins() {
        let metadata = parse_metadata("Общая площадь: 54,3 м²\n21/18.2");
        assert_eq!(metadata.area, Some(54.3));
        assert_eq!(metadata.rooms, vec![OcrRoom { number: 21, area: 18.2 }]);
    }

    #[test]
    fn test_room_filters() {
        let rooms = parse_rooms("0/12.5 7/0.3 8/150 9/12.5 9/20.1");
        assert_eq!(rooms, vec![OcrRoom { number: 9, area: 12.5 }]);
    }

    #[test]
    fn test_decimal_tail_is_not_a_room_number() {
        let rooms = parse_rooms("2.83\n21/18.2");
        assert_eq!(rooms, vec![OcrRoom { number: 21, area: 18.2 }]);
    }

    #[test]
    fn test_city_address() {
        assert_eq!(
            parse_address("Москва, Тверская 12, кв. 5").as_deref(),
            Some("Москва, Тверская 12, кв. 5")
        );
        assert_eq!(parse_address("ул. Мира 1"), None);
    }
}
