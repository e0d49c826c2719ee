use std::fmt;

use log::debug;

use crate::config::AppConfig;
use crate::normalize::normalize;
use crate::spotify::{Catalog, SearchCandidate, SpotifyResult};

/// Which selection rule picked the album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Strict search, album and artist both equal.
    StrictExact,
    /// Strict search, album equal, artist ignored.
    StrictAlbum,
    /// Loose search, candidate title contains the wanted title.
    LooseContains,
    /// Loose search, wanted title contains the candidate title.
    LooseContainedIn,
    /// Loose search, nothing matched the title: first of the pool.
    LooseFirst,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchRule::StrictExact => "exact match",
            MatchRule::StrictAlbum => "exact title, other artist",
            MatchRule::LooseContains => "title variant",
            MatchRule::LooseContainedIn => "shortened title",
            MatchRule::LooseFirst => "best guess",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: SearchCandidate,
    pub rule: MatchRule,
}

/// Artist and album in comparable form.
struct Target {
    artist: String,
    album: String,
}

impl Target {
    fn new(artist: &str, album: &str) -> Self {
        Self {
            artist: normalize(artist),
            album: normalize(album),
        }
    }
}

pub fn strict_query(artist: &str, album: &str) -> String {
    format!("album:{} artist:{}", album.trim(), artist.trim())
}

pub fn loose_query(artist: &str, album: &str) -> String {
    format!("{} {}", artist.trim(), album.trim())
}

fn select_strict(candidates: &[SearchCandidate], target: &Target) -> Option<(usize, MatchRule)> {
    let album_matches = |c: &SearchCandidate| normalize(&c.name) == target.album;
    if let Some(index) = candidates
        .iter()
        .position(|c| album_matches(c) && normalize(&c.artist_name) == target.artist)
    {
        return Some((index, MatchRule::StrictExact));
    }
    candidates
        .iter()
        .position(album_matches)
        .map(|index| (index, MatchRule::StrictAlbum))
}

fn select_loose(candidates: &[SearchCandidate], target: &Target) -> Option<(usize, MatchRule)> {
    let same_artist = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| normalize(&c.artist_name) == target.artist)
        .collect::<Vec<_>>();
    let pool = if same_artist.is_empty() {
        candidates.iter().enumerate().collect::<Vec<_>>()
    } else {
        same_artist
    };
    let names = pool
        .iter()
        .map(|(index, c)| (*index, normalize(&c.name)))
        .collect::<Vec<_>>();

    if let Some((index, _)) = names.iter().find(|(_, name)| name.contains(&target.album)) {
        return Some((*index, MatchRule::LooseContains));
    }
    if let Some((index, _)) = names
        .iter()
        .find(|(_, name)| target.album.contains(name.as_str()))
    {
        return Some((*index, MatchRule::LooseContainedIn));
    }
    pool.first().map(|(index, _)| (*index, MatchRule::LooseFirst))
}

/// Turns a loosely typed (artist, album) pair into a catalog album with two
/// progressively looser searches. Search failures propagate untouched.
pub struct AlbumResolver<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> AlbumResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub async fn resolve(&self, artist: &str, album: &str) -> SpotifyResult<Option<Resolution>> {
        let target = Target::new(artist, album);

        let strict = self
            .catalog
            .search_albums(&strict_query(artist, album), AppConfig::SEARCH_CANDIDATE_LIMIT)
            .await?;
        if let Some((index, rule)) = select_strict(&strict, &target) {
            debug!("strict search matched {:?} ({})", strict[index].name, rule);
            return Ok(Some(Resolution {
                candidate: strict[index].clone(),
                rule,
            }));
        }
        debug!(
            "strict search gave no match among {} candidates for {} - {}",
            strict.len(),
            artist,
            album
        );

        let loose = self
            .catalog
            .search_albums(&loose_query(artist, album), AppConfig::SEARCH_CANDIDATE_LIMIT)
            .await?;
        let selected = select_loose(&loose, &target).map(|(index, rule)| {
            debug!("loose search picked {:?} ({})", loose[index].name, rule);
            Resolution {
                candidate: loose[index].clone(),
                rule,
            }
        });
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::fake::{candidate, FakeCatalog};

    #[tokio::test]
    async fn test_strict_exact_match() {
        let catalog = FakeCatalog::new().with_search(
            &strict_query("X", "Heartbreaker"),
            vec![candidate("h1", "Heartbreaker", "X")],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("X", "Heartbreaker")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "h1");
        assert_eq!(resolution.rule, MatchRule::StrictExact);
        assert_eq!(catalog.searches().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_prefers_same_artist_over_earlier_title_match() {
        let catalog = FakeCatalog::new().with_search(
            &strict_query("Simon & Garfunkel", "Bookends"),
            vec![
                candidate("cover", "Bookends", "Tribute Band"),
                candidate("real", "BOOKENDS", "Simon and Garfunkel"),
            ],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("Simon & Garfunkel", "Bookends")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "real");
        assert_eq!(resolution.rule, MatchRule::StrictExact);
    }

    #[tokio::test]
    async fn test_strict_title_only_match() {
        let catalog = FakeCatalog::new().with_search(
            &strict_query("Various", "Pulp Fiction"),
            vec![candidate("ost", "Pulp Fiction", "Various Artists")],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("Various", "Pulp Fiction")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "ost");
        assert_eq!(resolution.rule, MatchRule::StrictAlbum);
    }

    #[tokio::test]
    async fn test_loose_search_finds_deluxe_edition() {
        let catalog = FakeCatalog::new()
            .with_search(
                &strict_query("X", "Heartbreaker"),
                vec![candidate("other", "Heartbreak Hotel", "X")],
            )
            .with_search(
                &loose_query("X", "Heartbreaker"),
                vec![candidate("deluxe", "Heartbreaker (Deluxe)", "X")],
            );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("X", "Heartbreaker")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "deluxe");
        assert_eq!(resolution.rule, MatchRule::LooseContains);
        assert_eq!(
            catalog.searches(),
            vec![strict_query("X", "Heartbreaker"), loose_query("X", "Heartbreaker")]
        );
    }

    #[tokio::test]
    async fn test_loose_search_prefers_same_artist_pool() {
        let catalog = FakeCatalog::new().with_search(
            &loose_query("Nas", "Illmatic XX"),
            vec![
                candidate("karaoke", "Illmatic XX", "Karaoke Stars"),
                candidate("nas", "Illmatic", "Nas"),
            ],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("Nas", "Illmatic XX")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "nas");
        assert_eq!(resolution.rule, MatchRule::LooseContainedIn);
    }

    #[tokio::test]
    async fn test_loose_search_empty_title_is_contained_in_target() {
        let catalog = FakeCatalog::new().with_search(
            &loose_query("Nobody", "Illmatic"),
            vec![
                candidate("first", "Something Else", "A"),
                candidate("qmark", "?", "B"),
            ],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("Nobody", "Illmatic")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "qmark");
        assert_eq!(resolution.rule, MatchRule::LooseContainedIn);
    }

    #[tokio::test]
    async fn test_loose_search_falls_back_to_first_candidate() {
        let catalog = FakeCatalog::new().with_search(
            &loose_query("Someone", "Unknown Title"),
            vec![
                candidate("first", "Completely Different", "Another"),
                candidate("second", "Also Different", "Third"),
            ],
        );
        let resolution = AlbumResolver::new(&catalog)
            .resolve("Someone", "Unknown Title")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.candidate.id, "first");
        assert_eq!(resolution.rule, MatchRule::LooseFirst);
    }

    #[tokio::test]
    async fn test_no_candidates_is_unresolved() {
        let catalog = FakeCatalog::new();
        let resolution = AlbumResolver::new(&catalog).resolve("C", "D").await.unwrap();
        assert_eq!(resolution, None);
        assert_eq!(catalog.searches().len(), 2);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let catalog = FakeCatalog::new().failing_search(&strict_query("A", "B"));
        assert!(AlbumResolver::new(&catalog).resolve("A", "B").await.is_err());
    }
}
