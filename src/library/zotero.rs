//! Read-only queries over a Zotero SQLite database.

use std::{collections::HashMap, path::Path};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::debug;

use super::{Author, Collection, CollectionId, ItemId, Library, LibraryError};

pub struct ZoteroLibrary {
    conn: Connection,
}

impl ZoteroLibrary {
    /// Open the database at `path` read-only.
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        if !path.exists() {
            return Err(LibraryError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.display(), "opened zotero database");
        Ok(Self { conn })
    }
}

impl Library for ZoteroLibrary {
    fn find_collection(
        &self,
        name: &str,
        parent: Option<CollectionId>,
    ) -> Result<Option<CollectionId>, LibraryError> {
        let id = match parent {
            Some(parent) => self
                .conn
                .query_row(
                    "SELECT collectionID FROM collections \
                     WHERE collectionName = ?1 AND parentCollectionID = ?2",
                    params![name, parent],
                    |row| row.get(0),
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT collectionID FROM collections WHERE collectionName = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?,
        };
        Ok(id)
    }

    fn child_collections(&self, parent: CollectionId) -> Result<Vec<Collection>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT collectionID, collectionName FROM collections \
             WHERE parentCollectionID = ?1 ORDER BY collectionID",
        )?;
        let rows = stmt.query_map(params![parent], |row| {
            Ok(Collection {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn find_authored_item(
        &self,
        collection: CollectionId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<ItemId>, LibraryError> {
        let id = self
            .conn
            .query_row(
                "SELECT i.itemID
                 FROM collectionItems ci
                 JOIN items i ON ci.itemID = i.itemID
                 JOIN itemCreators ic ON i.itemID = ic.itemID
                 JOIN creators c ON ic.creatorID = c.creatorID
                 WHERE ci.collectionID = ?1 AND c.firstName = ?2 AND c.lastName = ?3
                 LIMIT 1",
                params![collection, first_name, last_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn item_fields(&self, item: ItemId) -> Result<HashMap<String, String>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT f.fieldName, CAST(v.value AS TEXT)
             FROM itemData d
             JOIN itemDataValues v ON d.valueID = v.valueID
             JOIN fields f ON d.fieldID = f.fieldID
             WHERE d.itemID = ?1",
        )?;
        let rows = stmt.query_map(params![item], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn item_creators(&self, item: ItemId) -> Result<Vec<Author>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.firstName, c.lastName
             FROM itemCreators ic
             JOIN creators c ON ic.creatorID = c.creatorID
             WHERE ic.itemID = ?1
             ORDER BY ic.orderIndex",
        )?;
        let rows = stmt.query_map(params![item], |row| {
            Ok(Author {
                first: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                last: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn collection_venues(&self, collection: CollectionId) -> Result<Vec<String>, LibraryError> {
        // One venue per item; a non-empty journal title wins over the proceedings title. Items
        // whose venue fields are all empty contribute nothing.
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(
                 MAX(CASE WHEN f.fieldName = 'publicationTitle'
                          THEN NULLIF(CAST(v.value AS TEXT), '') END),
                 MAX(CASE WHEN f.fieldName = 'proceedingsTitle'
                          THEN NULLIF(CAST(v.value AS TEXT), '') END)) AS venue
             FROM collectionItems ci
             JOIN itemData d ON ci.itemID = d.itemID
             JOIN fields f ON d.fieldID = f.fieldID
             JOIN itemDataValues v ON d.valueID = v.valueID
             WHERE ci.collectionID = ?1
               AND f.fieldName IN ('publicationTitle', 'proceedingsTitle')
             GROUP BY ci.itemID
             HAVING venue IS NOT NULL
             ORDER BY ci.itemID",
        )?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}
