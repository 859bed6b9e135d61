use chrono::NaiveDateTime;

/// Timestamp suffix shared by artifacts and archives of one run.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn file_stamp(at: NaiveDateTime) -> String {
    at.format(FILE_STAMP_FORMAT).to_string()
}

/// Makes a group key usable inside a file name. Spaces and characters that
/// are path separators or reserved on common filesystems become `_`; an
/// empty key becomes `_`.
pub fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// `<prefix>_<key>_<stamp>.<extension>`
pub fn artifact_file_name(prefix: &str, key: &str, at: NaiveDateTime, extension: &str) -> String {
    format!("{prefix}_{}_{}.{extension}", sanitize_key(key), file_stamp(at))
}

/// `<run_label>_<stamp>.zip`
pub fn archive_file_name(run_label: &str, at: NaiveDateTime) -> String {
    format!("{run_label}_{}.zip", file_stamp(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 23)
            .unwrap()
            .and_hms_opt(8, 38, 5)
            .unwrap()
    }

    #[test]
    fn artifact_names_follow_prefix_key_stamp() {
        assert_eq!(
            artifact_file_name("Rapport", "KSAR NORD", at(), "pdf"),
            "Rapport_KSAR_NORD_20250623_083805.pdf"
        );
        assert_eq!(
            artifact_file_name("Releve_Agent", "A007", at(), "pdf"),
            "Releve_Agent_A007_20250623_083805.pdf"
        );
    }

    #[test]
    fn archive_names_use_run_label() {
        assert_eq!(
            archive_file_name("Rapports_Multi_Centres", at()),
            "Rapports_Multi_Centres_20250623_083805.zip"
        );
    }

    #[test]
    fn sanitize_replaces_separators_and_keeps_case() {
        assert_eq!(sanitize_key("a/b\\c d"), "a_b_c_d");
        assert_eq!(sanitize_key("Ksar"), "Ksar");
        assert_eq!(sanitize_key("0042"), "0042");
        assert_eq!(sanitize_key(""), "_");
        assert_eq!(sanitize_key("Tevragh-Zeina"), "Tevragh-Zeina");
    }
}
