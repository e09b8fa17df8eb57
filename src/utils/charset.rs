//! 字符编码处理

use encoding_rs::Encoding;

/// 按给定的字符集标签把字节解码为字符串
///
/// 标签无法识别时按 UTF-8 宽松解码（无效序列替换为 U+FFFD）。
/// 字节开头的 BOM 优先于标签。
pub fn decode_content(data: &[u8], charset: &str) -> String {
    if let Some(encoding) = Encoding::for_label(charset.trim().as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.into_owned()
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}
