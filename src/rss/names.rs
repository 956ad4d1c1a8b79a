//! RSS 2.0 element, attribute and relationship names.

/// RSS 2.0 elements live in no namespace.
pub const RSS20_NAMESPACE: Option<&str> = None;
pub const VERSION: &str = "2.0";

pub mod elements {
    pub const RSS: &str = "rss";
    pub const CHANNEL: &str = "channel";
    pub const ITEM: &str = "item";
    pub const TITLE: &str = "title";
    pub const LINK: &str = "link";
    pub const DESCRIPTION: &str = "description";
    pub const AUTHOR: &str = "author";
    pub const CATEGORY: &str = "category";
    pub const COMMENTS: &str = "comments";
    pub const ENCLOSURE: &str = "enclosure";
    pub const GUID: &str = "guid";
    pub const PUB_DATE: &str = "pubDate";
    pub const LAST_BUILD_DATE: &str = "lastBuildDate";
    pub const SOURCE: &str = "source";
    pub const IMAGE: &str = "image";
    pub const URL: &str = "url";
    pub const MANAGING_EDITOR: &str = "managingEditor";
    pub const CLOUD: &str = "cloud";
    pub const SKIP_DAYS: &str = "skipDays";
    pub const DAY: &str = "day";
    pub const SKIP_HOURS: &str = "skipHours";
    pub const HOUR: &str = "hour";
}

pub mod attributes {
    pub const VERSION: &str = "version";
    pub const URL: &str = "url";
    pub const LENGTH: &str = "length";
    pub const TYPE: &str = "type";
    pub const DOMAIN: &str = "domain";
    pub const IS_PERMA_LINK: &str = "isPermaLink";
    pub const PORT: &str = "port";
    pub const PATH: &str = "path";
    pub const REGISTER_PROCEDURE: &str = "registerProcedure";
    pub const PROTOCOL: &str = "protocol";
}

pub mod link_types {
    pub const ALTERNATE: &str = "alternate";
    pub const ENCLOSURE: &str = "enclosure";
    pub const COMMENTS: &str = "comments";
    pub const SOURCE: &str = "source";
    pub const GUID: &str = "guid";
}

pub mod contributor_types {
    pub const AUTHOR: &str = "author";
    pub const MANAGING_EDITOR: &str = "managingEditor";
}

/// True when `namespace` is the RSS 2.0 namespace (none).
pub fn is_rss_namespace(namespace: Option<&str>) -> bool {
    namespace.map_or(true, str::is_empty)
}
