use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::document_storage::{
    Collection, Document, DocumentStorage, DocumentStorageError, FieldUpdate,
};

type DocumentKey = (Collection, String);

#[derive(Clone, Default)]
pub struct InMemoryDocumentStorage {
    storage: Arc<Mutex<HashMap<DocumentKey, Document>>>,
}

impl InMemoryDocumentStorage {
    pub fn new(storage: HashMap<DocumentKey, Document>) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    pub async fn document_count(&self, collection: Collection) -> usize {
        let hash_map_handle = self.storage.lock().await;

        hash_map_handle
            .keys()
            .filter(|(entry_collection, _)| *entry_collection == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStorage for InMemoryDocumentStorage {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DocumentStorageError> {
        let hash_map_handle = self.storage.lock().await;

        Ok(hash_map_handle
            .get(&(collection, id.to_owned()))
            .map(|document| document.to_owned()))
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<(), DocumentStorageError> {
        let mut hash_map_handle = self.storage.lock().await;

        hash_map_handle.insert((collection, id.to_owned()), document);

        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), DocumentStorageError> {
        let mut hash_map_handle = self.storage.lock().await;

        let key = (collection, id.to_owned());
        let mut document = hash_map_handle
            .get(&key)
            .cloned()
            .ok_or_else(|| DocumentStorageError::NotFound {
                collection,
                id: id.to_owned(),
            })?;

        for update in updates {
            apply_update(&mut document, update)?;
        }

        hash_map_handle.insert(key, document);

        Ok(())
    }
}

fn apply_update(document: &mut Document, update: FieldUpdate) -> Result<(), DocumentStorageError> {
    match update {
        FieldUpdate::Set { field, value } => {
            document.insert(field, value);
        }
        FieldUpdate::ArrayAppend { field, values } => {
            array_field(document, &field)?.extend(values);
        }
        FieldUpdate::ArrayUnion { field, values } => {
            let array = array_field(document, &field)?;
            for value in values {
                if !array.contains(&value) {
                    array.push(value);
                }
            }
        }
    }

    Ok(())
}

fn array_field<'a>(
    document: &'a mut Document,
    field: &str,
) -> Result<&'a mut Vec<Value>, DocumentStorageError> {
    let entry = document
        .entry(field.to_owned())
        .or_insert_with(|| Value::Array(vec![]));

    if entry.is_null() {
        *entry = Value::Array(vec![]);
    }

    entry
        .as_array_mut()
        .ok_or_else(|| DocumentStorageError::NotAnArray(field.to_owned()))
}
