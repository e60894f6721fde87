//! HTTP 客户端实现
//!
//! 用 `gloo-net` 的 fetch 封装实现核心库的 `HttpClient` 接口，
//! 身份服务、文档存储和天气客户端共用这一个实现。

use gloo_net::http::{Request, RequestBuilder};
use seatrack::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

fn builder(req: &HttpRequest) -> RequestBuilder {
    let mut builder = match req.method {
        HttpMethod::Get => Request::get(&req.url),
        HttpMethod::Post => Request::post(&req.url),
        HttpMethod::Patch => Request::patch(&req.url),
    };
    for (key, value) in &req.headers {
        builder = builder.header(key, value);
    }
    builder
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = builder(&req);
        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError(format!("请求构建失败: {}", e)))?;

        let resp = request
            .send()
            .await
            .map_err(|e| TransportError(format!("网络错误: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(format!("响应读取失败: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}
