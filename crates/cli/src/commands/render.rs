//! Plain-text rendering of the two lists.

use std::io::{self, Write};

use labsite_core::{Member, Post};

/// News posts, newest first as stored.
pub fn posts(out: &mut impl Write, posts: &[Post]) -> io::Result<()> {
    if posts.is_empty() {
        return writeln!(out, "No news yet.");
    }

    for post in posts {
        writeln!(out, "#{} [{}] {} | {}", post.id, post.date, post.category, post.title)?;
        if !post.author.is_empty() {
            writeln!(out, "    by {}", post.author)?;
        }
        for line in post.description.lines() {
            writeln!(out, "    {line}")?;
        }
        if let Some(url) = &post.image_url {
            writeln!(out, "    image: {url}")?;
        }
    }
    Ok(())
}

/// Members, or the "no results" notice when the filter matched nothing.
pub fn members(out: &mut impl Write, members: &[&Member]) -> io::Result<()> {
    if members.is_empty() {
        return writeln!(out, "No results found.");
    }

    for member in members {
        write!(out, "#{} {}", member.id, member.name)?;
        if !member.role.is_empty() {
            write!(out, " ({})", member.role)?;
        }
        if !member.status.is_empty() {
            write!(out, " - {}", member.status)?;
        }
        let tags: Vec<&str> = member.tag_list().collect();
        if !tags.is_empty() {
            write!(out, " [{}]", tags.join(", "))?;
        }
        writeln!(out)?;
        if let Some(url) = &member.image_url {
            writeln!(out, "    image: {url}")?;
        }
    }
    Ok(())
}

pub fn tags(out: &mut impl Write, tags: &[String]) -> io::Result<()> {
    for tag in tags {
        writeln!(out, "{tag}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use labsite_core::{MemberId, PostId};

    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_posts() {
        let post = Post {
            id: PostId::new(3),
            title: "Best Paper Award".to_string(),
            category: "Award".to_string(),
            date: "2025-01-10".to_string(),
            author: "BVI Lab".to_string(),
            description: "First line\nSecond line".to_string(),
            image_url: Some("https://x/y.png".to_string()),
        };
        assert_eq!(
            render(|out| posts(out, &[post])),
            "#3 [2025-01-10] Award | Best Paper Award\n    by BVI Lab\n    First line\n    Second line\n    image: https://x/y.png\n"
        );
        assert_eq!(render(|out| posts(out, &[])), "No news yet.\n");
    }

    #[test]
    fn test_members() {
        let kim = Member {
            id: MemberId::new(1),
            name: "Kim".to_string(),
            role: "Ph.D. Student".to_string(),
            status: "in progress".to_string(),
            tags: "AI,  Web3".to_string(),
            image_url: None,
        };
        let bare = Member {
            id: MemberId::new(2),
            name: "Lee".to_string(),
            role: String::new(),
            status: String::new(),
            tags: String::new(),
            image_url: None,
        };
        assert_eq!(
            render(|out| members(out, &[&kim, &bare])),
            "#1 Kim (Ph.D. Student) - in progress [AI, Web3]\n#2 Lee\n"
        );
    }

    #[test]
    fn test_empty_filter_result_is_distinct() {
        assert_eq!(render(|out| members(out, &[])), "No results found.\n");
    }

    #[test]
    fn test_tags() {
        let universe = vec!["All".to_string(), "AI".to_string()];
        assert_eq!(render(|out| tags(out, &universe)), "All\nAI\n");
    }
}
