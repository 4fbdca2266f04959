//! Generic language tags to provider-specific tags.

/// A provider's language tag convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Google,
    LibreTranslate,
    MyMemory,
    Deepl,
    Baidu,
    Microsoft,
}

/// Map a generic tag to the target vocabulary. Google takes generic tags
/// unchanged. For the others, tags missing from the table pass through,
/// case-normalized per the vocabulary.
pub fn map(tag: &str, vocabulary: Vocabulary) -> String {
    let tag = tag.trim();
    if vocabulary == Vocabulary::Google {
        return tag.to_string();
    }
    let lower = tag.to_ascii_lowercase();

    let mapped = match vocabulary {
        Vocabulary::Google => None,
        Vocabulary::LibreTranslate => libre(&lower),
        Vocabulary::MyMemory => mymemory(&lower),
        Vocabulary::Deepl => deepl(&lower),
        Vocabulary::Baidu => baidu(&lower),
        Vocabulary::Microsoft => microsoft(&lower),
    };

    match mapped {
        Some(code) => code.to_string(),
        None if vocabulary == Vocabulary::Deepl => tag.to_ascii_uppercase(),
        None => lower,
    }
}

fn libre(tag: &str) -> Option<&'static str> {
    match tag {
        "zh-cn" | "zh-hans" => Some("zh"),
        "zh-tw" | "zh-hant" => Some("zt"),
        _ => None,
    }
}

fn mymemory(tag: &str) -> Option<&'static str> {
    match tag {
        "auto" => Some("autodetect"),
        "zh" | "zh-cn" | "zh-hans" => Some("zh-CN"),
        "zh-tw" | "zh-hant" => Some("zh-TW"),
        _ => None,
    }
}

fn deepl(tag: &str) -> Option<&'static str> {
    match tag {
        "zh" | "zh-cn" | "zh-hans" => Some("ZH"),
        "zh-tw" | "zh-hant" => Some("ZH-HANT"),
        "en" => Some("EN"),
        "ja" => Some("JA"),
        "ko" => Some("KO"),
        "pt" => Some("PT"),
        _ => None,
    }
}

fn baidu(tag: &str) -> Option<&'static str> {
    match tag {
        "zh" | "zh-cn" | "zh-hans" => Some("zh"),
        "zh-tw" | "zh-hant" => Some("cht"),
        "ja" => Some("jp"),
        "ko" => Some("kor"),
        "ms" => Some("may"),
        "fr" => Some("fra"),
        "es" => Some("spa"),
        "ar" => Some("ara"),
        "vi" => Some("vie"),
        "da" => Some("dan"),
        "fi" => Some("fin"),
        "sv" => Some("swe"),
        _ => None,
    }
}

fn microsoft(tag: &str) -> Option<&'static str> {
    match tag {
        "zh" | "zh-cn" | "zh-hans" => Some("zh-Hans"),
        "zh-tw" | "zh-hant" => Some("zh-Hant"),
        _ => None,
    }
}
