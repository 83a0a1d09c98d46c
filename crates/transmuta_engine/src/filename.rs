/// Suggested download name for a converted item:
/// `converted_{sanitized_stem}.{target_id}`.
pub fn download_filename(original: &str, target_id: &str) -> String {
    let stem = match original.rfind('.') {
        Some(idx) if idx > 0 => &original[..idx],
        _ => original,
    };
    format!("converted_{}.{target_id}", sanitize_stem(stem))
}

fn sanitize_stem(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "file".to_string();
    }
    if cleaned.len() > 80 {
        cleaned.truncate(80);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::download_filename;

    #[test]
    fn stem_swaps_extension_for_target() {
        assert_eq!(download_filename("photo.png", "jpeg"), "converted_photo.jpeg");
        assert_eq!(
            download_filename("archive.tar.gz", "txt"),
            "converted_archive.tar.txt"
        );
    }

    #[test]
    fn extensionless_names_keep_their_stem() {
        assert_eq!(download_filename("README", "txt"), "converted_README.txt");
        assert_eq!(download_filename(".hidden", "txt"), "converted_hidden.txt");
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(
            download_filename("a/b:c*d.png", "png"),
            "converted_a_b_c_d.png"
        );
        assert_eq!(download_filename("???.png", "png"), "converted_file.png");
    }

    #[test]
    fn reserved_windows_names_get_a_suffix() {
        assert_eq!(download_filename("CON.txt", "pdf"), "converted_CON_.pdf");
    }
}
