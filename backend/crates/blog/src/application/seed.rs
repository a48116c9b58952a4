//! Development sample content
//!
//! Categories, tags, three published posts and one approved comment.
//! Everything is keyed by slug; rows that already exist are reused.

use std::sync::Arc;

use kernel::id::{CategoryId, TagId, UserId};

use crate::domain::entity::{
    category::NewCategory, comment::NewComment, post::NewPost, tag::NewTag,
};
use crate::domain::repository::BlogRepository;
use crate::domain::value_object::slug::Slug;
use crate::error::BlogResult;

const CATEGORIES: [(&str, &str, &str); 4] = [
    ("Technology", "technology", "Articles about software and tools"),
    ("Life", "life", "Notes from everyday life"),
    ("Travel", "travel", "Trips and places worth visiting"),
    ("Cooking", "cooking", "Recipes and kitchen experiments"),
];

const TAGS: [(&str, &str); 5] = [
    ("Go", "go"),
    ("TypeScript", "typescript"),
    ("React", "react"),
    ("Docker", "docker"),
    ("Tips", "tips"),
];

struct SamplePost {
    title: &'static str,
    slug: &'static str,
    content: &'static str,
    excerpt: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
}

const POSTS: [SamplePost; 3] = [
    SamplePost {
        title: "Introduction to Go",
        slug: "go-introduction",
        content: "Go is a programming language developed at Google. It lets you write simple and efficient code.",
        excerpt: "The basics of writing Go.",
        category: "technology",
        tags: &["go"],
    },
    SamplePost {
        title: "Combining React and TypeScript",
        slug: "react-typescript",
        content: "Pairing React with TypeScript gives you type-safe frontend code that stays easy to maintain.",
        excerpt: "Getting started with React and TypeScript",
        category: "technology",
        tags: &["react"],
    },
    SamplePost {
        title: "Recommended Travel Destinations",
        slug: "recommended-travel",
        content: "This year's recommended destinations, from quiet places surrounded by nature to busy city sights.",
        excerpt: "Spots every traveler should see",
        category: "travel",
        tags: &[],
    },
];

/// Counts of rows created by one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeededContent {
    pub categories: usize,
    pub tags: usize,
    pub posts: usize,
    pub comments: usize,
}

pub async fn seed_content<R>(repo: Arc<R>, author_id: UserId) -> BlogResult<SeededContent>
where
    R: BlogRepository,
{
    let mut seeded = SeededContent::default();

    let mut categories: Vec<(&str, CategoryId)> = Vec::with_capacity(CATEGORIES.len());
    for (name, slug, description) in CATEGORIES {
        let slug_value = Slug::from_db(slug);
        let id = match repo.find_category_by_slug(&slug_value).await? {
            Some(existing) => existing.id,
            None => {
                seeded.categories += 1;
                repo.create_category(&NewCategory {
                    name: name.to_string(),
                    slug: slug_value,
                    description: Some(description.to_string()),
                })
                .await?
                .id
            }
        };
        categories.push((slug, id));
    }

    let mut tags: Vec<(&str, TagId)> = Vec::with_capacity(TAGS.len());
    for (name, slug) in TAGS {
        let slug_value = Slug::from_db(slug);
        let id = match repo.find_tag_by_slug(&slug_value).await? {
            Some(existing) => existing.id,
            None => {
                seeded.tags += 1;
                repo.create_tag(&NewTag {
                    name: name.to_string(),
                    slug: slug_value,
                })
                .await?
                .id
            }
        };
        tags.push((slug, id));
    }

    for sample in &POSTS {
        let slug = Slug::from_db(sample.slug);
        if repo.find_post_by_slug(&slug).await?.is_some() {
            continue;
        }

        let category_id = categories
            .iter()
            .find(|(s, _)| *s == sample.category)
            .map(|(_, id)| *id);
        let tag_ids: Vec<TagId> = tags
            .iter()
            .filter(|(s, _)| sample.tags.contains(s))
            .map(|(_, id)| *id)
            .collect();

        let post_id = repo
            .create_post(
                &NewPost {
                    title: sample.title.to_string(),
                    slug,
                    content: sample.content.to_string(),
                    excerpt: sample.excerpt.to_string(),
                    image_url: None,
                    published: true,
                    author_id,
                    category_id,
                },
                &tag_ids,
            )
            .await?;
        seeded.posts += 1;
        tracing::info!(post_id = %post_id, slug = sample.slug, "Sample post created");

        // Only a freshly created post gets the sample comment
        if sample.slug == "go-introduction" {
            repo.create_comment(&NewComment {
                post_id,
                author: "Reader A".to_string(),
                email: "reader@example.com".to_string(),
                content: "This was really helpful!".to_string(),
                approved: true,
            })
            .await?;
            seeded.comments += 1;
        }
    }

    tracing::info!(
        categories = seeded.categories,
        tags = seeded.tags,
        posts = seeded.posts,
        comments = seeded.comments,
        "Sample content seeded"
    );
    Ok(seeded)
}
