use redb::TableDefinition;

/// Comic records: id -> ComicRecord (msgpack). Ids grow monotonically, so key
/// order is insertion order.
pub const COMICS: TableDefinition<u64, &[u8]> = TableDefinition::new("comics");

/// Unique index: (tag, name) -> comic id
pub const COMIC_KEYS: TableDefinition<(&str, &str), u64> = TableDefinition::new("comic_keys");

/// Per-tag ordering index: (tag, comic id) -> ()
pub const TAG_COMICS: TableDefinition<(&str, u64), ()> = TableDefinition::new("tag_comics");

/// Created tags: tag -> creation timestamp (unix seconds)
pub const TAGS: TableDefinition<&str, i64> = TableDefinition::new("tags");

/// Public tag list, as shown to readers
pub const TAG_NAMES: TableDefinition<&str, ()> = TableDefinition::new("tag_names");

/// Tag descriptions: tag -> free text
pub const TAG_DESCRIPTIONS: TableDefinition<&str, &str> = TableDefinition::new("tag_descriptions");

/// Counters: name -> value
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

pub const NEXT_COMIC_ID: &str = "next_comic_id";
