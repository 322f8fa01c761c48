use std::fmt;

use serde::{Deserialize, Serialize};

/// 프롬프트를 사용할 생성 모델 종류
///
/// 알 수 없는 값은 에러 대신 `Other`로 보관하며, 이 경우 상세화 템플릿 없이 요청합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Modality {
    #[default]
    Text,
    Image,
    Video,
    Code,
    /// 정규화된(소문자, 앞뒤 공백 제거) 원본 이름
    Other(String),
}

impl Modality {
    pub const KNOWN: [Modality; 4] = [
        Modality::Text,
        Modality::Image,
        Modality::Video,
        Modality::Code,
    ];

    /// 대소문자 구분 없이 파싱합니다. 실패하지 않습니다.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "text" => Modality::Text,
            "image" => Modality::Image,
            "video" => Modality::Video,
            "code" => Modality::Code,
            _ => Modality::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Code => "code",
            Modality::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Modality::Other(_))
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Modality {
    fn from(raw: String) -> Self {
        Modality::parse(&raw)
    }
}

impl From<&str> for Modality {
    fn from(raw: &str) -> Self {
        Modality::parse(raw)
    }
}

impl From<Modality> for String {
    fn from(modality: Modality) -> Self {
        modality.as_str().to_string()
    }
}
