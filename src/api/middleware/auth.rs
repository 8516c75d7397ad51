//! `/api/*` 共享密钥认证
//!
//! `Authorization: Bearer <key>` 或 `Authorization: <key>`，常量时间比较。

use actix_service::{Service, Transform};
use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, trace};

use crate::api::error::ApiError;

/// API key authentication middleware
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Arc<str>,
}

impl ApiKeyAuth {
    pub fn new(api_key: impl Into<Arc<str>>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// 去掉可选的 `Bearer ` 前缀
fn presented_key(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header)
}

/// 空密钥永远不通过
pub fn key_matches(expected: &str, presented: &str) -> bool {
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    api_key: Arc<str>,
}

impl<S> ApiKeyAuthMiddleware<S> {
    fn reject<B>(req: ServiceRequest, err: ApiError) -> ServiceResponse<EitherBody<B>> {
        info!("API authentication failed for {}: {}", req.path(), err);
        req.into_response(err.error_response().map_into_right_body())
    }
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            // 空值等同于缺失；非 UTF-8 的头视为不匹配
            let header = match req.headers().get(AUTHORIZATION) {
                Some(value) if !value.is_empty() => value.to_str().unwrap_or_default(),
                _ => return Ok(Self::reject(req, ApiError::MissingAuthorization)),
            };

            if !key_matches(&api_key, presented_key(header)) {
                return Ok(Self::reject(req, ApiError::InvalidApiKey));
            }

            trace!("API key accepted for {}", req.path());
            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presented_key() {
        assert_eq!(presented_key("Bearer secret"), "secret");
        assert_eq!(presented_key("secret"), "secret");
        assert_eq!(presented_key("bearer secret"), "bearer secret");
    }

    #[test]
    fn test_key_matches() {
        assert!(key_matches("secret", "secret"));
        assert!(!key_matches("secret", "secre"));
        assert!(!key_matches("secret", "secret2"));
        assert!(!key_matches("", ""));
    }
}
