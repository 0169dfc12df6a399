//! Decoding of BoardGameGeek XML API v2 documents.
//!
//! BGG encodes most scalar fields as `value` attributes on empty elements
//! (`<yearpublished value="1995"/>`) and interleaves repeated elements
//! (`name`, `link`) with others, hence the `overlapped-lists` feature.
//! Numeric attributes are read as strings and parsed leniently: BGG sends
//! empty values for unknown data.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{BoardGame, BoardGameSearchResult, HotBoardGame, UNKNOWN_CREDIT};
use crate::error::ClientError;

const SERVICE: &str = "BoardGameGeek";

const LINK_CATEGORY: &str = "boardgamecategory";
const LINK_MECHANIC: &str = "boardgamemechanic";
const LINK_DESIGNER: &str = "boardgamedesigner";
const LINK_PUBLISHER: &str = "boardgamepublisher";

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Items<T> {
    #[serde(rename = "item", default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ValueAttr {
    #[serde(rename = "@value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct NameXml {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct LinkXml {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct SearchItemXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "name", default)]
    names: Vec<NameXml>,
    yearpublished: Option<ValueAttr>,
}

#[derive(Debug, Deserialize)]
struct HotItemXml {
    #[serde(rename = "@id")]
    id: String,
    name: Option<ValueAttr>,
    thumbnail: Option<ValueAttr>,
}

#[derive(Debug, Deserialize)]
struct ThingXml {
    #[serde(rename = "name", default)]
    names: Vec<NameXml>,
    description: Option<String>,
    image: Option<String>,
    yearpublished: Option<ValueAttr>,
    minplayers: Option<ValueAttr>,
    maxplayers: Option<ValueAttr>,
    playingtime: Option<ValueAttr>,
    #[serde(rename = "link", default)]
    links: Vec<LinkXml>,
    statistics: Option<StatisticsXml>,
}

#[derive(Debug, Deserialize)]
struct StatisticsXml {
    ratings: Option<RatingsXml>,
}

#[derive(Debug, Deserialize)]
struct RatingsXml {
    average: Option<ValueAttr>,
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

fn decode<T: DeserializeOwned>(xml: &str) -> Result<Items<T>, ClientError> {
    quick_xml::de::from_str(xml).map_err(|e| ClientError::decode(SERVICE, e))
}

/// Decode a `/search` response. An empty `<items/>` yields no results.
pub fn parse_search_results(xml: &str) -> Result<Vec<BoardGameSearchResult>, ClientError> {
    let doc: Items<SearchItemXml> = decode(xml)?;
    Ok(doc
        .items
        .into_iter()
        .map(|item| BoardGameSearchResult {
            name: primary_name(&item.names).unwrap_or_default(),
            year_published: attr_text(item.yearpublished).unwrap_or_else(|| "N/A".to_string()),
            id: item.id,
        })
        .collect())
}

/// Decode a `/hot` response.
pub fn parse_hot_games(xml: &str) -> Result<Vec<HotBoardGame>, ClientError> {
    let doc: Items<HotItemXml> = decode(xml)?;
    Ok(doc
        .items
        .into_iter()
        .map(|item| HotBoardGame {
            name: attr_text(item.name).unwrap_or_default(),
            thumbnail: attr_text(item.thumbnail).unwrap_or_default(),
            id: item.id,
        })
        .collect())
}

/// Decode a `/thing?stats=1` response for game `id`.
///
/// Returns [`ClientError::NotFound`] when the document holds no item.
pub fn parse_game_details(id: &str, xml: &str) -> Result<BoardGame, ClientError> {
    let doc: Items<ThingXml> = decode(xml)?;
    let thing = doc
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::NotFound(format!("board game {}", id)))?;

    let links_of = |kind: &str| -> Vec<String> {
        thing
            .links
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.value.clone())
            .collect()
    };
    let first_link = |kind: &str| -> String {
        thing
            .links
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.value.clone())
            .unwrap_or_else(|| UNKNOWN_CREDIT.to_string())
    };

    let rating = thing
        .statistics
        .as_ref()
        .and_then(|s| s.ratings.as_ref())
        .and_then(|r| r.average.as_ref())
        .map(|a| lenient_number(&a.value))
        .unwrap_or_default();

    Ok(BoardGame {
        id: id.to_string(),
        name: primary_name(&thing.names).unwrap_or_else(|| UNKNOWN_CREDIT.to_string()),
        description: thing.description.clone().unwrap_or_default(),
        image: thing.image.clone().unwrap_or_default(),
        year: number_attr(&thing.yearpublished),
        min_players: number_attr(&thing.minplayers),
        max_players: number_attr(&thing.maxplayers),
        playing_time: number_attr(&thing.playingtime),
        categories: links_of(LINK_CATEGORY),
        mechanics: links_of(LINK_MECHANIC),
        designer: first_link(LINK_DESIGNER),
        publisher: first_link(LINK_PUBLISHER),
        rating,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The `primary` name, else the first one listed.
fn primary_name(names: &[NameXml]) -> Option<String> {
    names
        .iter()
        .find(|n| n.kind == "primary")
        .or_else(|| names.first())
        .map(|n| n.value.clone())
}

fn attr_text(attr: Option<ValueAttr>) -> Option<String> {
    attr.map(|a| a.value).filter(|v| !v.trim().is_empty())
}

fn number_attr<T: std::str::FromStr + Default>(attr: &Option<ValueAttr>) -> T {
    attr.as_ref()
        .map(|a| lenient_number(&a.value))
        .unwrap_or_default()
}

fn lenient_number<T: std::str::FromStr + Default>(raw: &str) -> T {
    raw.trim().parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <name type="primary" value="CATAN"/>
        <yearpublished value="1995" />
    </item>
    <item type="boardgame" id="278">
        <name type="primary" value="Catan Card Game"/>
    </item>
</items>"#;

    const THING_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <thumbnail>https://cf.geekdo-images.com/thumb.jpg</thumbnail>
        <image>https://cf.geekdo-images.com/original.jpg</image>
        <name type="alternate" sortindex="1" value="Die Siedler von Catan" />
        <name type="primary" sortindex="1" value="CATAN" />
        <description>In CATAN, players try to be the dominant force on the island.</description>
        <yearpublished value="1995" />
        <minplayers value="3" />
        <maxplayers value="4" />
        <poll name="suggested_numplayers" title="User Suggested Number of Players" totalvotes="2">
            <results numplayers="3"><result value="Best" numvotes="1" /></results>
        </poll>
        <playingtime value="120" />
        <link type="boardgamecategory" id="1021" value="Economic" />
        <link type="boardgamecategory" id="1026" value="Negotiation" />
        <link type="boardgamemechanic" id="2072" value="Dice Rolling" />
        <link type="boardgamedesigner" id="11" value="Klaus Teuber" />
        <link type="boardgamepublisher" id="37" value="KOSMOS" />
        <link type="boardgamepublisher" id="17" value="999 Games" />
        <link type="boardgamemechanic" id="2008" value="Trading" />
        <statistics page="1">
            <ratings>
                <usersrated value="120000" />
                <average value="7.10915" />
                <bayesaverage value="6.9" />
            </ratings>
        </statistics>
    </item>
</items>"#;

    const HOT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item id="224517" rank="1">
        <thumbnail value="https://cf.geekdo-images.com/brass.jpg"/>
        <name value="Brass: Birmingham"/>
        <yearpublished value="2018" />
    </item>
    <item id="342942" rank="2">
        <name value="Ark Nova"/>
    </item>
</items>"#;

    #[test]
    fn test_parse_search_results() {
        let results = parse_search_results(SEARCH_XML).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "13");
        assert_eq!(results[0].name, "CATAN");
        assert_eq!(results[0].year_published, "1995");
        assert_eq!(results[1].year_published, "N/A");
    }

    #[test]
    fn test_parse_empty_search() {
        let xml = r#"<items total="0" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;
        assert!(parse_search_results(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_game_details() {
        let game = parse_game_details("13", THING_XML).unwrap();
        assert_eq!(game.id, "13");
        assert_eq!(game.name, "CATAN");
        assert!(game.description.starts_with("In CATAN"));
        assert_eq!(game.image, "https://cf.geekdo-images.com/original.jpg");
        assert_eq!(game.year, 1995);
        assert_eq!(game.min_players, 3);
        assert_eq!(game.max_players, 4);
        assert_eq!(game.playing_time, 120);
        assert_eq!(game.categories, vec!["Economic", "Negotiation"]);
        assert_eq!(game.mechanics, vec!["Dice Rolling", "Trading"]);
        assert_eq!(game.designer, "Klaus Teuber");
        assert_eq!(game.publisher, "KOSMOS");
        assert!((game.rating - 7.10915).abs() < 1e-9);
    }

    #[test]
    fn test_details_without_primary_name_or_credits() {
        let xml = r#"<items><item type="boardgame" id="5">
            <name type="alternate" value="Only Alias" />
            <yearpublished value="" />
        </item></items>"#;
        let game = parse_game_details("5", xml).unwrap();
        assert_eq!(game.name, "Only Alias");
        assert_eq!(game.year, 0);
        assert_eq!(game.designer, UNKNOWN_CREDIT);
        assert_eq!(game.publisher, UNKNOWN_CREDIT);
        assert_eq!(game.rating, 0.0);
    }

    #[test]
    fn test_details_missing_item_is_not_found() {
        let xml = r#"<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;
        let err = parse_game_details("999999", xml).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[test]
    fn test_parse_hot_games() {
        let games = parse_hot_games(HOT_XML).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name, "Brass: Birmingham");
        assert_eq!(games[0].thumbnail, "https://cf.geekdo-images.com/brass.jpg");
        assert_eq!(games[1].thumbnail, "");
    }

    #[test]
    fn test_malformed_xml_is_decode_error() {
        let err = parse_hot_games("<items><item id=\"1\">").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
