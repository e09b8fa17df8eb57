use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::error::{ContentUrlsError, ContentUrlsResult};

/// 序列化文档
///
/// 输出是解析器规范化之后的 HTML：缺失的 `html`/`head`/`body` 会被补全，
/// 属性统一使用双引号。
pub fn serialize_document(dom: RcDom) -> ContentUrlsResult<String> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default()).map_err(|error| {
        ContentUrlsError::MalformedContent {
            media_type: "text/html".to_string(),
            reason: error.to_string(),
        }
    })?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
