//! caudit: SEO content audit for sitemap-driven sites.
//!
//! caudit crawls the blog and collection pages listed in a site's sitemap, extracts their SEO
//! fields and body keywords, joins them with search metrics exported from Yandex Webmaster and
//! Google Search Console, and reports three kinds of opportunity: queries the site has no
//! content for, pages whose click-through rate lags their position, and pages competing for
//! the same keyword.

#![warn(missing_docs)]

pub mod cli;
