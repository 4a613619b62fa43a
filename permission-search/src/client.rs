//! HTTP implementation of [`PermissionSearch`].

use async_trait::async_trait;
use model::{Caller, Kind, Order, Page, Query, Record, Right, Window};
use reqwest::{header::AUTHORIZATION, Client, Url};
use tracing::{debug, error};

use crate::{PermissionError, PermissionSearch};

/// Path and optional JSON body of one permission-search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub segments: Vec<String>,
    /// Id-set selections are POSTed with the ids as body; all others are GET.
    pub body: Option<Vec<String>>,
}

/// Map a selection onto the permission-search URL scheme.
pub fn route(kind: Kind, right: Right, query: &Query) -> Route {
    let res = kind.resource().to_string();
    let right = right.as_str().to_string();

    let (segments, body) = match query {
        Query::All => (vec!["jwt".into(), "list".into(), res, right], None),
        Query::List { page, order } => {
            let mut s = vec!["jwt".into(), "list".into(), res, right];
            push_page(&mut s, page);
            if let Some(order) = order {
                push_order(&mut s, order);
            }
            (s, None)
        }
        Query::Search { text, page, order } => {
            let mut s = vec!["jwt".into(), "search".into(), res, text.clone(), right];
            push_page(&mut s, page);
            if let Some(order) = order {
                push_order(&mut s, order);
            }
            (s, None)
        }
        Query::Tag { tag, window } => {
            let mut s = vec!["jwt".into(), "select".into(), res, "tag".into(), tag.clone(), right];
            push_window(&mut s, window.as_ref());
            (s, None)
        }
        Query::UserTag { tag, window } => {
            let mut s = vec![
                "jwt".into(),
                "select".into(),
                res,
                "usertag".into(),
                tag.clone(),
                right,
            ];
            push_window(&mut s, window.as_ref());
            (s, None)
        }
        Query::Ids { ids, window } => {
            let mut s = vec!["ids".into(), "select".into(), res, right];
            push_window(&mut s, window.as_ref());
            (s, Some(ids.clone()))
        }
    };

    Route { segments, body }
}

fn push_page(segments: &mut Vec<String>, page: &Page) {
    segments.push(page.limit.to_string());
    segments.push(page.offset.to_string());
}

fn push_order(segments: &mut Vec<String>, order: &Order) {
    segments.push(order.feature.clone());
    segments.push(order.direction.as_str().to_string());
}

fn push_window(segments: &mut Vec<String>, window: Option<&Window>) {
    if let Some(window) = window {
        push_page(segments, &window.page);
        push_order(segments, &window.order);
    }
}

/// Talks to a permission-search deployment over HTTP.
#[derive(Debug, Clone)]
pub struct PermSearchClient {
    http: Client,
    base_url: Url,
}

impl PermSearchClient {
    pub fn new(base_url: &str, http: Client) -> Result<Self, PermissionError> {
        let invalid = |reason: String| PermissionError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[String]) -> Result<Url, PermissionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PermissionError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base url".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl PermissionSearch for PermSearchClient {
    async fn select(
        &self,
        caller: &Caller,
        kind: Kind,
        right: Right,
        query: &Query,
    ) -> Result<Vec<Record>, PermissionError> {
        let route = route(kind, right, query);
        let url = self.url(&route.segments)?;
        let endpoint = url.path().to_string();
        debug!(endpoint = %endpoint, query = query.label(), "permission-search request");

        let request = match &route.body {
            Some(ids) => self.http.post(url).json(ids),
            None => self.http.get(url),
        };

        let resp = request
            .header(AUTHORIZATION, caller.authorization())
            .send()
            .await
            .map_err(|source| {
                error!(endpoint = %endpoint, error = %source, "permission-search unreachable");
                PermissionError::Request {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|source| PermissionError::Request {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            error!(endpoint = %endpoint, status = status.as_u16(), "permission-search rejected request");
            return Err(PermissionError::Status {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| PermissionError::Decode { endpoint, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Direction;

    fn segs(route: &Route) -> Vec<&str> {
        route.segments.iter().map(String::as_str).collect()
    }

    fn window() -> Window {
        Window::new(Page::new(10, 20), Order::new("name", Direction::Desc))
    }

    #[test]
    fn list_all() {
        let r = route(Kind::Device, Right::Read, &Query::All);
        assert_eq!(segs(&r), ["jwt", "list", "devices", "r"]);
        assert_eq!(r.body, None);
    }

    #[test]
    fn list_paged_and_ordered() {
        let plain = Query::List { page: Page::new(5, 0), order: None };
        assert_eq!(
            segs(&route(Kind::Gateway, Right::Read, &plain)),
            ["jwt", "list", "gateways", "r", "5", "0"]
        );

        let ordered = Query::List {
            page: Page::new(5, 10),
            order: Some(Order::new("name", Direction::Asc)),
        };
        assert_eq!(
            segs(&route(Kind::Gateway, Right::Read, &ordered)),
            ["jwt", "list", "gateways", "r", "5", "10", "name", "asc"]
        );
    }

    #[test]
    fn search_puts_text_before_right() {
        let q = Query::Search {
            text: "lamp".into(),
            page: Page::new(1, 2),
            order: Some(Order::new("device_type", Direction::Desc)),
        };
        assert_eq!(
            segs(&route(Kind::Device, Right::Read, &q)),
            ["jwt", "search", "devices", "lamp", "r", "1", "2", "device_type", "desc"]
        );
    }

    #[test]
    fn tag_selections() {
        let tag = Query::Tag { tag: "floor1".into(), window: None };
        assert_eq!(
            segs(&route(Kind::Device, Right::Read, &tag)),
            ["jwt", "select", "devices", "tag", "floor1", "r"]
        );

        let user_tag = Query::UserTag { tag: "mine".into(), window: Some(window()) };
        assert_eq!(
            segs(&route(Kind::Gateway, Right::Read, &user_tag)),
            ["jwt", "select", "gateways", "usertag", "mine", "r", "10", "20", "name", "desc"]
        );
    }

    #[test]
    fn id_selection_posts_ids() {
        let q = Query::Ids { ids: vec!["a".into(), "b".into()], window: Some(window()) };
        let r = route(Kind::Device, Right::Read, &q);
        assert_eq!(segs(&r), ["ids", "select", "devices", "r", "10", "20", "name", "desc"]);
        assert_eq!(r.body, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn url_escapes_search_text() {
        let client = PermSearchClient::new("http://perm:8080/", Client::new()).unwrap();
        let q = Query::Search { text: "a b/c".into(), page: Page::new(1, 0), order: None };
        let url = client.url(&route(Kind::Device, Right::Read, &q).segments).unwrap();
        assert_eq!(url.path(), "/jwt/search/devices/a%20b%2Fc/r/1/0");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            PermSearchClient::new("not a url", Client::new()),
            Err(PermissionError::InvalidUrl { .. })
        ));
    }
}
