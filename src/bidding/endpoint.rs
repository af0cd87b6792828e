// src/bidding/endpoint.rs

use tracing::debug;

use crate::error::AdapterError;
use crate::model::ext::parse_imp_ext;
use crate::openrtb::request::BidRequest;

/// 宏展开参数，未设置的宏展开为空字符串
#[derive(Debug, Clone, Default)]
pub struct EndpointTemplateParams {
    pub host: String,
    pub publisher_id: String,
    pub zone_id: String,
    pub source_id: String,
    pub account_id: String,
    pub ad_unit: String,
    pub media_type: String,
    pub page_id: String,
    pub supply_id: String,
    pub imp_id: String,
    pub seat_id: String,
    pub token_id: String,
}

impl EndpointTemplateParams {
    fn lookup(&self, name: &str) -> Option<&str> {
        let value = match name {
            "Host" => &self.host,
            "PublisherID" => &self.publisher_id,
            "ZoneID" => &self.zone_id,
            "SourceId" => &self.source_id,
            "AccountID" => &self.account_id,
            "AdUnit" => &self.ad_unit,
            "MediaType" => &self.media_type,
            "PageID" => &self.page_id,
            "SupplyId" => &self.supply_id,
            "ImpID" => &self.imp_id,
            "SeatID" => &self.seat_id,
            "TokenID" => &self.token_id,
            _ => return None,
        };
        Some(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Macro(String),
}

/// 预编译的 endpoint 模板，占位符语法为 `{{.MacroName}}`
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl EndpointTemplate {
    pub fn parse(source: &str) -> Result<Self, AdapterError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| AdapterError::Build(format!("unclosed action in {:?}", source)))?;
            let action = after_open[..end].trim();
            let name = action
                .strip_prefix('.')
                .filter(|name| is_identifier(name))
                .ok_or_else(|| AdapterError::Build(format!("unsupported action {:?} in {:?}", action, source)))?;
            segments.push(Segment::Macro(name.to_string()));
            rest = &after_open[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { source: source.to_string(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 展开模板；遇到未知宏时返回 MacroResolution 错误
    pub fn resolve(&self, params: &EndpointTemplateParams) -> Result<String, AdapterError> {
        let mut url = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Macro(name) => {
                    let value = params.lookup(name).ok_or_else(|| {
                        AdapterError::MacroResolution(format!("can't evaluate field {}", name))
                    })?;
                    url.push_str(value);
                }
            }
        }
        Ok(url)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 第一个 imp 的 ext.bidder.endpoint 优先，否则以空参数展开配置的模板
pub fn resolve_endpoint(template: &EndpointTemplate, request: &BidRequest) -> Result<String, AdapterError> {
    if let Some(first) = request.imp.first() {
        match parse_imp_ext(first) {
            Ok(ext) if !ext.endpoint.is_empty() => {
                debug!(imp_id = %first.id, endpoint = %ext.endpoint, "using per-imp endpoint override");
                return Ok(ext.endpoint);
            }
            Ok(_) => {}
            Err(e) => debug!(imp_id = %first.id, error = %e, "no endpoint override"),
        }
    }
    template.resolve(&EndpointTemplateParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openrtb::request::Imp;
    use proptest::prelude::*;
    use serde_json::json;

    fn request_with_exts(exts: Vec<Option<serde_json::Value>>) -> BidRequest {
        BidRequest {
            id: "req".to_string(),
            imp: exts
                .into_iter()
                .enumerate()
                .map(|(i, ext)| Imp { id: format!("imp-{}", i), ext, ..Default::default() })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_url_round_trips() {
        let template = EndpointTemplate::parse("https://mocktioneer.edgecompute.app/openrtb2/auction").unwrap();
        let url = template.resolve(&EndpointTemplateParams::default()).unwrap();
        assert_eq!(url, "https://mocktioneer.edgecompute.app/openrtb2/auction");
    }

    #[test]
    fn known_macros_expand() {
        let template = EndpointTemplate::parse("http://{{.Host}}/bid?pub={{ .PublisherID }}").unwrap();
        let params = EndpointTemplateParams {
            host: "upstream.test".to_string(),
            publisher_id: "42".to_string(),
            ..Default::default()
        };
        assert_eq!(template.resolve(&params).unwrap(), "http://upstream.test/bid?pub=42");
        assert_eq!(
            template.resolve(&EndpointTemplateParams::default()).unwrap(),
            "http:///bid?pub="
        );
    }

    #[test]
    fn malformed_templates_fail_at_parse() {
        for source in ["http://{{.Host/bid", "http://{{}}/bid", "http://{{Host}}/bid", "http://{{.9x}}"] {
            assert!(matches!(EndpointTemplate::parse(source), Err(AdapterError::Build(_))), "{}", source);
        }
    }

    #[test]
    fn unknown_macro_fails_at_resolve() {
        let template = EndpointTemplate::parse("http://{{.Nope}}/bid").unwrap();
        let err = template.resolve(&EndpointTemplateParams::default()).unwrap_err();
        assert!(matches!(err, AdapterError::MacroResolution(_)));
    }

    #[test]
    fn first_imp_override_wins() {
        let template = EndpointTemplate::parse("http://configured.test/bid").unwrap();
        let request = request_with_exts(vec![
            Some(json!({"bidder": {"endpoint": "http://override.test/x"}})),
            Some(json!({"bidder": {"endpoint": "http://ignored.test"}})),
        ]);
        assert_eq!(resolve_endpoint(&template, &request).unwrap(), "http://override.test/x");
    }

    #[test]
    fn override_on_later_imp_is_ignored() {
        let template = EndpointTemplate::parse("http://configured.test/bid").unwrap();
        let request = request_with_exts(vec![
            Some(json!({"bidder": {"bid": 1.0}})),
            Some(json!({"bidder": {"endpoint": "http://ignored.test"}})),
        ]);
        assert_eq!(resolve_endpoint(&template, &request).unwrap(), "http://configured.test/bid");
    }

    #[test]
    fn override_bypasses_broken_template() {
        let template = EndpointTemplate::parse("http://{{.Nope}}/bid").unwrap();
        let request = request_with_exts(vec![Some(json!({"bidder": {"endpoint": "http://ok.test"}}))]);
        assert_eq!(resolve_endpoint(&template, &request).unwrap(), "http://ok.test");

        let request = request_with_exts(vec![None]);
        assert!(resolve_endpoint(&template, &request).is_err());
    }

    proptest! {
        #[test]
        fn without_override_resolves_to_template(
            host in "[a-z]{1,12}\\.test",
            bids in prop::collection::vec(0.0f64..20.0, 0..5),
        ) {
            let source = format!("https://{}/openrtb2/auction", host);
            let template = EndpointTemplate::parse(&source).unwrap();
            let request = request_with_exts(
                bids.iter().map(|bid| Some(json!({"bidder": {"bid": bid}}))).collect(),
            );
            prop_assert_eq!(resolve_endpoint(&template, &request).unwrap(), source);
        }

        #[test]
        fn override_always_wins(path in "[a-z0-9/]{0,20}") {
            let endpoint = format!("https://override.test/{}", path);
            let template = EndpointTemplate::parse("https://configured.test/{{.Host}}").unwrap();
            let request = request_with_exts(vec![Some(json!({"bidder": {"endpoint": endpoint.clone()}}))]);
            prop_assert_eq!(resolve_endpoint(&template, &request).unwrap(), endpoint);
        }
    }
}
