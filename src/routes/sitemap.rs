// ABOUTME: XML sitemap for search engines
// ABOUTME: Lists the home page, categories, active businesses and locations, and published pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::LocationLevel;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// One `<url>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// App path, starting with `/`
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub priority: f32,
}

impl SitemapEntry {
    fn new(path: String, priority: f32) -> Self {
        Self {
            path,
            last_modified: None,
            priority,
        }
    }
}

/// Render a `urlset` document
#[must_use]
pub fn render_sitemap(base_url: &str, entries: &[SitemapEntry]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        let loc = html_escape::encode_text(&format!("{base}{}", entry.path)).into_owned();
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{loc}</loc>");
        if let Some(modified) = entry.last_modified {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", modified.format("%Y-%m-%d"));
        }
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Sitemap routes implementation
pub struct SitemapRoutes;

impl SitemapRoutes {
    /// Create the sitemap route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/sitemap.xml", get(Self::handle_sitemap))
            .with_state(resources)
    }

    /// Collect every public URL
    async fn collect_entries(resources: &ServerResources) -> AppResult<Vec<SitemapEntry>> {
        let database = &resources.database;
        let mut entries = vec![SitemapEntry::new("/".to_owned(), 1.0)];

        for category in database.content().list_categories(false).await? {
            entries.push(SitemapEntry::new(format!("/categories/{}", category.slug), 0.8));
        }

        for (slug, updated_at) in database.businesses().list_active_slugs().await? {
            entries.push(SitemapEntry {
                last_modified: Some(updated_at),
                ..SitemapEntry::new(format!("/businesses/{slug}"), 0.7)
            });
        }

        // Children are only reachable through active parents
        let locations = database.locations();
        let mut paths: HashMap<Uuid, String> = HashMap::new();
        for (level, priority) in [
            (LocationLevel::City, 0.6),
            (LocationLevel::District, 0.5),
            (LocationLevel::Neighborhood, 0.4),
        ] {
            for node in locations.list(level, None, false).await? {
                let path = match node.parent_id {
                    None => format!("/{}", node.slug),
                    Some(parent_id) => match paths.get(&parent_id) {
                        Some(parent_path) => format!("{parent_path}/{}", node.slug),
                        None => continue,
                    },
                };
                entries.push(SitemapEntry::new(path.clone(), priority));
                paths.insert(node.id, path);
            }
        }

        for (slug, updated_at) in database.content().list_published_slugs().await? {
            entries.push(SitemapEntry {
                last_modified: Some(updated_at),
                ..SitemapEntry::new(format!("/pages/{slug}"), 0.3)
            });
        }
        Ok(entries)
    }

    /// Handle GET /sitemap.xml
    async fn handle_sitemap(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let entries = Self::collect_entries(&resources).await?;
        let xml = render_sitemap(&resources.config.public_base_url, &entries);
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            xml,
        )
            .into_response())
    }
}
