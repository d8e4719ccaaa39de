//! 输出文件命名

use regex::Regex;
use std::sync::OnceLock;

/// 把场景描述等任意文本转换成安全的文件名（不含扩展名）
pub fn file_stem(text: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| {
        Regex::new(r#"[\\/:*?"<>|\s]+"#).expect("file name pattern is valid")
    });
    let stem = re.replace_all(text.trim(), "_");
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_blanks() {
        assert_eq!(file_stem("Site 1 / PV+Storage"), "Site_1_PV+Storage");
        assert_eq!(file_stem("PV|size_kw"), "PV_size_kw");
        assert_eq!(file_stem("  "), "unnamed");
    }
}
