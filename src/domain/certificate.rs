//! Certificate records and the rules for accepting new ones.

use crate::domain::data_url::DataUrl;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use utoipa::ToSchema;

/// One entry of the gallery, exactly as persisted in the records file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    pub id: i64,
    pub title: String,
    pub issuer: String,
    /// Issue date as supplied by the client (e.g. `2024-01-01`). Used for ordering.
    pub date: String,
    /// Server-relative path of the stored image (`/images/<file>`).
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// RFC 3339 UTC timestamp of insertion.
    pub created_at: String,
}

/// Raw create input. Every field may be absent; `validate` decides what is acceptable.
#[derive(Debug, Clone, Default)]
pub struct CertificateDraft {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    pub short_description: Option<String>,
}

/// A draft that passed validation, with its image already decoded.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub image: DataUrl,
    pub short_description: Option<String>,
}

impl CertificateDraft {
    /// Checks required fields and decodes the image payload.
    ///
    /// Returns Err(String) with a client-facing message if invalid.
    pub fn validate(self) -> Result<NewCertificate, String> {
        let mut missing = Vec::new();
        let title = required(self.title, "title", &mut missing);
        let issuer = required(self.issuer, "issuer", &mut missing);
        let date = required(self.date, "date", &mut missing);
        let image = required(self.image, "image", &mut missing);

        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        let image = DataUrl::parse(&image).map_err(|e| format!("Invalid image: {}", e))?;

        Ok(NewCertificate {
            title,
            issuer,
            date,
            image,
            short_description: self.short_description,
        })
    }
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// Interprets a certificate date for ordering.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
pub fn parse_date_key(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if s.len() == 4 {
        if let Ok(year) = s.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        }
    }
    None
}

/// Newest first. Equal dates keep their stored order; unparseable dates go last.
pub fn sort_by_date_desc(records: &mut [Certificate]) {
    records.sort_by_cached_key(|c| {
        let key = parse_date_key(&c.date);
        (key.is_none(), Reverse(key))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(id: i64, date: &str) -> Certificate {
        Certificate {
            id,
            title: format!("cert {}", id),
            issuer: "issuer".to_string(),
            date: date.to_string(),
            image: format!("/images/{}.png", id),
            short_description: None,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn draft() -> CertificateDraft {
        CertificateDraft {
            title: Some("Rust".to_string()),
            issuer: Some("Ferris Academy".to_string()),
            date: Some("2024-05-01".to_string()),
            image: Some("data:image/png;base64,aGVsbG8=".to_string()),
            short_description: Some("ownership & borrowing".to_string()),
        }
    }

    #[test]
    fn validate_accepts_complete_draft() {
        let new = draft().validate().unwrap();
        assert_eq!(new.title, "Rust");
        assert_eq!(new.issuer, "Ferris Academy");
        assert_eq!(new.date, "2024-05-01");
        assert_eq!(new.image.bytes, b"hello");
        assert_eq!(new.short_description.as_deref(), Some("ownership & borrowing"));
    }

    #[test]
    fn validate_lists_every_missing_field() {
        let d = CertificateDraft {
            title: None,
            issuer: Some(String::new()),
            ..draft()
        };
        let err = d.validate().unwrap_err();
        assert_eq!(err, "Missing required fields: title, issuer");
    }

    #[test]
    fn validate_treats_empty_image_as_missing() {
        let d = CertificateDraft {
            image: Some(String::new()),
            ..draft()
        };
        assert_eq!(d.validate().unwrap_err(), "Missing required fields: image");
    }

    #[test]
    fn validate_rejects_undecodable_image() {
        let d = CertificateDraft {
            image: Some("data:image/png;base64,@@@".to_string()),
            ..draft()
        };
        assert!(d.validate().unwrap_err().starts_with("Invalid image"));
    }

    #[test]
    fn short_description_is_optional() {
        let d = CertificateDraft {
            short_description: None,
            ..draft()
        };
        assert!(d.validate().unwrap().short_description.is_none());
    }

    #[test]
    fn parses_supported_date_shapes() {
        let day = parse_date_key("2024-03-05").unwrap();
        assert_eq!(day.to_string(), "2024-03-05 00:00:00");
        assert_eq!(parse_date_key("2024-03").unwrap().to_string(), "2024-03-01 00:00:00");
        assert_eq!(parse_date_key("2024").unwrap().to_string(), "2024-01-01 00:00:00");
        assert_eq!(
            parse_date_key("2024-03-05T10:00:00+02:00").unwrap().to_string(),
            "2024-03-05 08:00:00"
        );
        assert_eq!(
            parse_date_key("2024-03-05T10:30").unwrap().to_string(),
            "2024-03-05 10:30:00"
        );
        assert!(parse_date_key("last spring").is_none());
    }

    #[test]
    fn sorts_newest_first() {
        let mut records = vec![cert(1, "2024-01-01"), cert(2, "2023-06-01"), cert(3, "2025-01-01")];
        sort_by_date_desc(&mut records);
        let dates: Vec<&str> = records.iter().map(|c| c.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-01", "2024-01-01", "2023-06-01"]);
    }

    #[test]
    fn equal_dates_keep_stored_order() {
        let mut records = vec![cert(1, "2024-01-01"), cert(2, "2024-01-01"), cert(3, "2024-01-01")];
        sort_by_date_desc(&mut records);
        let ids: Vec<i64> = records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unparseable_dates_go_last() {
        let mut records = vec![cert(1, "someday"), cert(2, "2020-01-01"), cert(3, "??"), cert(4, "2022-01-01")];
        sort_by_date_desc(&mut records);
        let ids: Vec<i64> = records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn absent_short_description_is_not_serialized() {
        let json = serde_json::to_value(cert(1, "2024-01-01")).unwrap();
        assert!(json.get("short_description").is_none());

        let back: Certificate = serde_json::from_value(json).unwrap();
        assert!(back.short_description.is_none());
    }
}
