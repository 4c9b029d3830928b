use crate::errors::GscError;
use crate::models::SiteList;
use crate::services::site_identity::{
    apex_from_input, apex_of_url_prefix, SiteIdentity, DOMAIN_PROPERTY_PREFIX,
};
use async_trait::async_trait;

/// Lists the properties the authenticated principal can query.
#[async_trait]
pub trait SiteLister: Send + Sync {
    async fn list_sites(&self) -> Result<SiteList, GscError>;
}

/// Finds the accessible property that `input` refers to.
///
/// A domain property for the input's apex always wins over URL-prefix
/// properties for the same apex. Among several URL-prefix matches the first
/// in listing order is taken; the API does not define that order.
pub async fn resolve_site(lister: &dyn SiteLister, input: &str) -> Result<SiteIdentity, GscError> {
    let listing = lister.list_sites().await?;
    let apex = apex_from_input(input);

    let domain_property = format!("{}{}", DOMAIN_PROPERTY_PREFIX, apex);
    if let Some(site) = listing
        .sites
        .iter()
        .find(|site| site.site_url.eq_ignore_ascii_case(&domain_property))
    {
        return Ok(SiteIdentity::parse(&site.site_url));
    }

    if let Some(site) = listing.sites.iter().find(|site| {
        apex_of_url_prefix(&site.site_url)
            .map(|candidate| candidate.eq_ignore_ascii_case(&apex))
            .unwrap_or(false)
    }) {
        return Ok(SiteIdentity::parse(&site.site_url));
    }

    Err(GscError::NotFound {
        input: input.to_string(),
        accessible: listing.identities(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Site;

    struct StaticLister(Result<Vec<&'static str>, GscError>);

    #[async_trait]
    impl SiteLister for StaticLister {
        async fn list_sites(&self) -> Result<SiteList, GscError> {
            let urls = self.0.clone()?;
            Ok(SiteList {
                sites: urls
                    .into_iter()
                    .map(|url| Site {
                        site_url: url.to_string(),
                        permission_level: "siteFullUser".to_string(),
                    })
                    .collect(),
                queried_at: chrono::Utc::now(),
            })
        }
    }

    async fn resolve_with(sites: Vec<&'static str>, input: &str) -> Result<String, GscError> {
        resolve_site(&StaticLister(Ok(sites)), input)
            .await
            .map(|identity| identity.to_string())
    }

    #[tokio::test]
    async fn domain_property_found_for_www_url() {
        let got = resolve_with(vec!["sc-domain:devleader.ca"], "https://www.devleader.ca").await;
        assert_eq!(got, Ok("sc-domain:devleader.ca".to_string()));
    }

    #[tokio::test]
    async fn domain_property_preferred_over_url_prefix() {
        let got = resolve_with(vec!["https://www.x.com/", "sc-domain:x.com"], "x.com").await;
        assert_eq!(got, Ok("sc-domain:x.com".to_string()));
    }

    #[tokio::test]
    async fn domain_property_match_ignores_case() {
        let got = resolve_with(vec!["sc-domain:X.com"], "x.com").await;
        assert_eq!(got, Ok("sc-domain:X.com".to_string()));
    }

    #[tokio::test]
    async fn url_prefix_fallback_when_no_domain_property() {
        let got = resolve_with(vec!["https://www.x.com/"], "x.com").await;
        assert_eq!(got, Ok("https://www.x.com/".to_string()));
    }

    #[tokio::test]
    async fn trailing_slash_input_still_finds_domain_property() {
        let got = resolve_with(vec!["sc-domain:x.com"], "https://www.x.com/").await;
        assert_eq!(got, Ok("sc-domain:x.com".to_string()));
    }

    #[tokio::test]
    async fn first_url_prefix_in_listing_order_wins() {
        let got = resolve_with(
            vec!["https://x.com/", "http://www.x.com/", "https://www.x.com/blog/"],
            "sc-domain:x.com",
        )
        .await;
        assert_eq!(got, Ok("https://x.com/".to_string()));
    }

    #[tokio::test]
    async fn subdomains_do_not_match_apex() {
        let got = resolve_with(vec!["https://blog.x.com/"], "x.com").await;
        assert!(matches!(got, Err(GscError::NotFound { .. })));
    }

    #[tokio::test]
    async fn miss_lists_every_accessible_property() {
        let got = resolve_with(vec!["sc-domain:other.com"], "x.com").await;
        assert_eq!(
            got,
            Err(GscError::NotFound {
                input: "x.com".to_string(),
                accessible: vec!["sc-domain:other.com".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let lister = StaticLister(Err(GscError::Upstream {
            status: 500,
            body: "boom".to_string(),
        }));
        let got = resolve_site(&lister, "x.com").await;
        assert_eq!(
            got,
            Err(GscError::Upstream {
                status: 500,
                body: "boom".to_string()
            })
        );
    }
}
