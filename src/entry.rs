use serde::Serialize;

/// One blog post ready for display. Every field is filled in at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub published_display: String,
    pub read_time_display: String,
    pub categories: Vec<String>,
    pub image_url: String,
    pub source_url: String,
    pub author: String,
}

struct FallbackPost {
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    published: &'static str,
    read_time: &'static str,
    categories: &'static [&'static str],
    image: &'static str,
}

const FALLBACK_SOURCE_URL: &str = "https://medium.com/@pranav.reveendran";
const FALLBACK_AUTHOR: &str = "Pranav Reveendran";

const FALLBACK_POSTS: [FallbackPost; 3] = [
    FallbackPost {
        title: "Autonomous Vehicle Data Processing Pipeline",
        excerpt: "Building a real-time data processing pipeline for autonomous vehicle sensor data using modern data engineering tools...",
        content: "Complete guide to building autonomous vehicle data processing systems",
        published: "December 15, 2024",
        read_time: "5 min read",
        categories: &["Autonomous Vehicles", "Data Engineering"],
        image: "/static/blog-1.jpeg",
    },
    FallbackPost {
        title: "Building AI-Powered Healthcare Analytics",
        excerpt: "Exploring machine learning applications in healthcare data analysis and predictive modeling for better patient outcomes...",
        content: "Deep dive into healthcare AI and machine learning applications",
        published: "November 28, 2024",
        read_time: "7 min read",
        categories: &["Healthcare", "Artificial Intelligence"],
        image: "/static/blog-3.jpeg",
    },
    FallbackPost {
        title: "Cloud-Native Data Engineering with AWS",
        excerpt: "Best practices for building scalable data pipelines using AWS services like Lambda, Glue, and Redshift...",
        content: "Comprehensive guide to AWS data engineering services and architecture",
        published: "November 10, 2024",
        read_time: "6 min read",
        categories: &["Cloud Computing", "Data Engineering"],
        image: "/static/blog-2.jpeg",
    },
];

/// The hand-curated posts shown before the feed loads and whenever it fails.
pub fn fallback_entries() -> Vec<FeedEntry> {
    FALLBACK_POSTS
        .iter()
        .enumerate()
        .map(|(i, post)| FeedEntry {
            id: format!("fallback-{}", i + 1),
            title: post.title.to_string(),
            excerpt: post.excerpt.to_string(),
            content: post.content.to_string(),
            published_display: post.published.to_string(),
            read_time_display: post.read_time.to_string(),
            categories: post.categories.iter().map(|c| c.to_string()).collect(),
            image_url: post.image.to_string(),
            source_url: FALLBACK_SOURCE_URL.to_string(),
            author: FALLBACK_AUTHOR.to_string(),
        })
        .collect()
}
