use super::credentials::{TokenError, TokenSource};
use crate::config::BackendConfig;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::sync::{Document, DocumentStore, StoreError};
use seatrack_shared::Identity;
use serde_json::{Map, Value, json};
use std::rc::Rc;

// =========================================================
// 类型化值编码 (Typed value wire format)
// =========================================================

/// JSON 值 -> 文档存储的类型化值
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // 整数以十进制字符串传输
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Document) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// 类型化值 -> JSON 值
pub fn decode_value(typed: &Value) -> Result<Value, StoreError> {
    let Some((kind, inner)) = typed.as_object().and_then(|m| m.iter().next()) else {
        return Err(StoreError::Malformed(format!("not a typed value: {}", typed)));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| StoreError::Malformed(format!("integerValue {:?}: {}", s, e))),
            Value::Number(_) => Ok(inner.clone()),
            other => Err(StoreError::Malformed(format!("integerValue {}", other))),
        },
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(StoreError::Malformed(format!("unsupported value type {}", other))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, StoreError> {
    fields
        .iter()
        .map(|(k, v)| decode_value(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

// =========================================================
// REST 文档存储
// =========================================================

// https://cloud.google.com/firestore/docs/reference/rest/v1/projects.databases.documents
//
// Request example
// curl -X PATCH \
//   -H "Authorization: Bearer <ID_TOKEN>" \
//   "https://firestore.googleapis.com/v1/projects/PROJECT/databases/(default)/documents/users/UID" \
//   -d '{"fields":{"firstName":{"stringValue":"Jean"}}}'
//
// 不带 updateMask 的 PATCH 会替换整个文档
pub struct FirestoreStore<C: HttpClient, T: TokenSource> {
    pub(super) client: C,
    config: BackendConfig,
    tokens: Rc<T>,
}

impl<C: HttpClient, T: TokenSource> FirestoreStore<C, T> {
    pub fn new(client: C, config: BackendConfig, tokens: Rc<T>) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }

    pub fn document_url(&self, collection: &str, key: &Identity) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.config.firestore_base_url, self.config.project_id, collection, key
        )
    }

    async fn send_with(&self, req: HttpRequest, token: &str) -> Result<HttpResponse, StoreError> {
        let req = req.with_header("Authorization", &format!("Bearer {}", token));
        self.client
            .send(req)
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    /// 没有凭据时在发出请求之前就拒绝；401 说明 id token 过期，刷新后重试一次
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, StoreError> {
        let token = self.tokens.id_token().ok_or(StoreError::PermissionDenied)?;
        let resp = self.send_with(req.clone(), &token).await?;
        if resp.status != 401 {
            return Ok(resp);
        }

        log::info!("[Store] id token rejected, refreshing");
        let token = self.tokens.refresh().await.map_err(|e| match e {
            TokenError::Unavailable(msg) => StoreError::Network(msg),
            TokenError::Missing | TokenError::Revoked(_) => StoreError::PermissionDenied,
        })?;
        self.send_with(req, &token).await
    }
}

fn status_error(resp: &HttpResponse) -> StoreError {
    match resp.status {
        401 | 403 => StoreError::PermissionDenied,
        status => StoreError::Network(format!("document store answered with status {}", status)),
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient, T: TokenSource> DocumentStore for FirestoreStore<C, T> {
    async fn get_record(
        &self,
        collection: &str,
        key: &Identity,
    ) -> Result<Option<Document>, StoreError> {
        let resp = self
            .send(HttpRequest::get(&self.document_url(collection, key)))
            .await?;

        if resp.status == 404 {
            return Ok(None);
        }
        if !resp.ok() {
            return Err(status_error(&resp));
        }

        let body: Value = resp
            .json()
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        match body.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields).map(Some),
            // 存在但没有任何字段的文档
            None => Ok(Some(Document::new())),
        }
    }

    async fn put_record(
        &self,
        collection: &str,
        key: &Identity,
        fields: &Document,
    ) -> Result<(), StoreError> {
        let req = HttpRequest::new(&self.document_url(collection, key), HttpMethod::Patch)
            .with_json(json!({ "fields": encode_fields(fields) }));

        let resp = self.send(req).await?;
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::request::MockHttpClient;

    const USER_DOC: &str = "https://firestore.googleapis.com/v1/projects/seatrack/databases/(default)/documents/users/u1";

    /// 固定的令牌来源，记录刷新次数
    struct StubTokens {
        current: RefCell<Option<String>>,
        next: RefCell<Result<String, TokenError>>,
        refreshes: Cell<usize>,
    }

    #[async_trait::async_trait(?Send)]
    impl TokenSource for StubTokens {
        fn id_token(&self) -> Option<String> {
            self.current.borrow().clone()
        }

        async fn refresh(&self) -> Result<String, TokenError> {
            self.refreshes.set(self.refreshes.get() + 1);
            let next = self.next.borrow().clone();
            if let Ok(token) = &next {
                *self.current.borrow_mut() = Some(token.clone());
            }
            next
        }
    }

    fn store(signed_in: bool) -> FirestoreStore<MockHttpClient, StubTokens> {
        let tokens = StubTokens {
            current: RefCell::new(signed_in.then(|| "id-token".to_string())),
            next: RefCell::new(Ok("fresh-token".to_string())),
            refreshes: Cell::new(0),
        };
        let config = BackendConfig {
            project_id: "seatrack".into(),
            api_key: "API".into(),
            ..BackendConfig::default()
        };
        FirestoreStore::new(MockHttpClient::new(), config, Rc::new(tokens))
    }

    #[test]
    fn test_typed_value_encoding() {
        let doc = json!({
            "name": "Galatée",
            "year": 1998,
            "length": 12.5,
            "sold": false,
            "note": null,
            "crew": ["Jean", 2],
            "engine": { "power": 40 }
        });
        let Value::Object(doc) = doc else { unreachable!() };

        let encoded = encode_fields(&doc);
        assert_eq!(encoded["name"], json!({ "stringValue": "Galatée" }));
        assert_eq!(encoded["year"], json!({ "integerValue": "1998" }));
        assert_eq!(encoded["length"], json!({ "doubleValue": 12.5 }));
        assert_eq!(encoded["sold"], json!({ "booleanValue": false }));
        assert_eq!(encoded["note"], json!({ "nullValue": null }));
        assert_eq!(
            encoded["engine"],
            json!({ "mapValue": { "fields": { "power": { "integerValue": "40" } } } })
        );

        assert_eq!(decode_fields(&encoded).unwrap(), doc);
    }

    #[test]
    fn test_unknown_value_type_is_malformed() {
        assert!(matches!(
            decode_value(&json!({ "geoPointValue": { "latitude": 1.0 } })),
            Err(StoreError::Malformed(_))
        ));
        assert!(decode_value(&json!("raw")).is_err());
    }

    #[tokio::test]
    async fn test_get_existing_document() {
        let store = store(true);
        store.client.mock_response(
            HttpMethod::Get,
            USER_DOC,
            200,
            json!({
                "name": "projects/seatrack/databases/(default)/documents/users/u1",
                "fields": {
                    "firstName": { "stringValue": "Jean" },
                    "lastName": { "stringValue": "Dupont" }
                },
                "createTime": "2024-05-01T10:00:00Z"
            }),
        );

        let doc = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc["firstName"], "Jean");
        assert_eq!(doc["lastName"], "Dupont");
        let req = store.client.last_request().unwrap();
        assert_eq!(req.headers.get("Authorization").unwrap(), "Bearer id-token");
    }

    #[tokio::test]
    async fn test_missing_document_is_absent() {
        let store = store(true);
        // MockHttpClient 对未注册的 URL 返回 404
        let doc = store.get_record("users", &Identity::new("u1")).await.unwrap();
        assert_eq!(doc, None);
    }

    #[tokio::test]
    async fn test_put_patches_whole_document() {
        let store = store(true);
        store
            .client
            .mock_response(HttpMethod::Patch, USER_DOC, 200, json!({}));
        let mut fields = Document::new();
        fields.insert("firstName".into(), json!("Jean"));
        fields.insert("phone".into(), json!(""));

        store
            .put_record("users", &Identity::new("u1"), &fields)
            .await
            .unwrap();

        let req = store.client.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert!(!req.url.contains("updateMask"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["fields"]["phone"], json!({ "stringValue": "" }));
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let store = store(true);
        store
            .client
            .mock_response(HttpMethod::Patch, USER_DOC, 403, json!({ "error": {} }));

        let err = store
            .put_record("users", &Identity::new("u1"), &Document::new())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_no_credential_sends_nothing() {
        let store = store(false);

        let err = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::PermissionDenied);
        assert_eq!(store.client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let store = store(true);
        store.client.mock_unreachable(USER_DOC);

        let err = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_retried() {
        let store = store(true);
        store
            .client
            .mock_response_once(HttpMethod::Get, USER_DOC, 401, json!({ "error": {} }));
        store.client.mock_response(
            HttpMethod::Get,
            USER_DOC,
            200,
            json!({ "fields": { "firstName": { "stringValue": "Jean" } } }),
        );

        let doc = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc["firstName"], "Jean");
        assert_eq!(store.tokens.refreshes.get(), 1);
        let requests = store.client.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].headers["Authorization"], "Bearer id-token");
        assert_eq!(requests[1].headers["Authorization"], "Bearer fresh-token");
    }

    #[tokio::test]
    async fn test_revoked_refresh_is_permission_denied_without_retry() {
        let store = store(true);
        *store.tokens.next.borrow_mut() = Err(TokenError::Revoked("TOKEN_EXPIRED".into()));
        store
            .client
            .mock_response(HttpMethod::Patch, USER_DOC, 401, json!({ "error": {} }));

        let err = store
            .put_record("users", &Identity::new("u1"), &Document::new())
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::PermissionDenied);
        assert_eq!(store.client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_token_service_outage_is_network_error() {
        let store = store(true);
        *store.tokens.next.borrow_mut() = Err(TokenError::Unavailable("offline".into()));
        store
            .client
            .mock_response(HttpMethod::Get, USER_DOC, 401, json!({ "error": {} }));

        let err = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Network("offline".into()));
    }

    #[tokio::test]
    async fn test_forbidden_does_not_refresh() {
        let store = store(true);
        store
            .client
            .mock_response(HttpMethod::Get, USER_DOC, 403, json!({ "error": {} }));

        let err = store
            .get_record("users", &Identity::new("u1"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::PermissionDenied);
        assert_eq!(store.tokens.refreshes.get(), 0);
    }
}
