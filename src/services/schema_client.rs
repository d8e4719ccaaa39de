//! 输入定义获取服务 - 业务能力层

use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpTransport;
use crate::models::{ApiEndpoints, InputSchema};
use crate::utils::logging::redact_api_key;
use serde_json::Value as JsonValue;
use tracing::info;

/// 从帮助接口获取输入定义
///
/// 任何失败都返回 `SchemaFetchFailed`，整个批次无法继续
pub async fn fetch_schema<T: HttpTransport>(
    transport: &T,
    endpoints: &ApiEndpoints,
) -> AppResult<(InputSchema, JsonValue)> {
    let url = endpoints.help_url();
    let shown_url = redact_api_key(&url);
    info!("📥 正在获取输入定义: {}", shown_url);

    let failed = |reason: String| AppError::SchemaFetchFailed {
        url: shown_url.clone(),
        reason,
    };

    let reply = transport
        .get(&url)
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !reply.is_success() {
        return Err(failed(format!("HTTP {}: {}", reply.status, reply.snippet())));
    }

    let document = reply
        .json()
        .map_err(|e| failed(format!("响应不是合法 JSON: {}", e)))?;
    if !document.is_object() {
        return Err(failed("响应不是 JSON 对象".to_string()));
    }

    let schema = InputSchema::from_value(&document);
    info!("✓ 输入定义获取成功，共 {} 个顶层节点", schema.root().len());
    Ok((schema, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{HttpReply, ScriptedTransport};
    use crate::models::{ApiVersion, SchemaNode};
    use serde_json::json;

    fn endpoints() -> ApiEndpoints {
        ApiEndpoints::new("https://reopt.test/api/v1/", "KEY", ApiVersion::Legacy)
    }

    #[tokio::test]
    async fn parses_schema_from_help_endpoint() {
        let transport = ScriptedTransport::new().with_gets([HttpReply::ok_json(&json!({
            "Scenario": {"description": {"default": ""}, "Site": {"PV": {"max_kw": {"default": 0}}}}
        }))]);

        let (schema, raw) = fetch_schema(&transport, &endpoints()).await.expect("schema");

        assert!(matches!(schema.root().get("Scenario"), Some(SchemaNode::Category(_))));
        assert!(raw.get("Scenario").is_some());
        assert_eq!(
            transport.get_calls(),
            vec!["https://reopt.test/api/v1/help?api_key=KEY".to_string()]
        );
    }

    #[tokio::test]
    async fn error_status_is_schema_fetch_failed() {
        let transport =
            ScriptedTransport::new().with_gets([HttpReply::new(403, "API_KEY_INVALID")]);

        let err = fetch_schema(&transport, &endpoints()).await.expect_err("403");
        match err {
            AppError::SchemaFetchFailed { url, reason } => {
                assert!(reason.contains("403"));
                assert!(url.ends_with("api_key=***"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let transport = ScriptedTransport::new().with_gets([HttpReply::ok_json(&json!([1, 2]))]);
        let err = fetch_schema(&transport, &endpoints()).await.expect_err("array");
        assert!(matches!(err, AppError::SchemaFetchFailed { .. }));
    }
}
