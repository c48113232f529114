//! The in-memory stores used through the collaborator traits, the way the
//! migration engine sees them.

use std::sync::Arc;

use mailstore_core::{
    AttachmentLoader, FetchType, Limit, MessageResult, MessageStoreV1, MessageStoreV2,
};
use mailstore_memory::fixtures::{metadata, TestDataBuilder};
use mailstore_memory::MemoryBackend;

#[tokio::test]
async fn test_v1_full_lookup_streams_attachments_once() {
    let backend = MemoryBackend::new();
    let seeded = TestDataBuilder::new(&backend)
        .with_attachment_message("Subject: a\r\n\r\nb", "attached body")
        .build()
        .await;
    let v1: Arc<dyn MessageStoreV1> = Arc::new(backend.v1.clone());

    let mut found = v1
        .retrieve_messages(&[*seeded[0].metadata()], FetchType::Full, Limit::unlimited())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let (message, stream) = found.remove(0);
    assert_eq!(message, seeded[0].message);
    let refs: Vec<_> = stream.collect();
    assert_eq!(refs, seeded[0].attachments);

    let loader: Arc<dyn AttachmentLoader> = Arc::new(backend.attachments.clone());
    let bodies = loader.load(&refs).await.unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].bytes, b"attached body".to_vec());
}

#[tokio::test]
async fn test_v1_lookup_of_unknown_metadata_is_empty() {
    let backend = MemoryBackend::new();
    let v1: Arc<dyn MessageStoreV1> = Arc::new(backend.v1.clone());

    let found = v1
        .retrieve_messages(&[metadata()], FetchType::Full, Limit::unlimited())
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_v1_paging_reaches_empty_page() {
    let backend = MemoryBackend::new();
    TestDataBuilder::new(&backend)
        .with_messages(5)
        .build()
        .await;
    let v1: Arc<dyn MessageStoreV1> = Arc::new(backend.v1.clone());

    let mut cursor = None;
    let mut seen = 0;
    loop {
        let page = v1.read_batch(cursor, 2).await.unwrap();
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= 2);
        seen += page.len();
        cursor = page.last().map(|raw| raw.message_id());
    }
    assert_eq!(seen, 5);
}

#[tokio::test]
async fn test_v2_save_then_retrieve() {
    let backend = MemoryBackend::new();
    let seeded = TestDataBuilder::new(&backend)
        .with_messages(1)
        .build()
        .await;
    let raw = &seeded[0];
    let v2: Arc<dyn MessageStoreV2> = Arc::new(backend.v2.clone());

    assert!(!v2.retrieve(raw.metadata()).await.unwrap().is_found());

    v2.save(raw).await.unwrap();
    v2.save(raw).await.unwrap();

    match v2.retrieve(raw.metadata()).await.unwrap() {
        MessageResult::Found(stored) => assert_eq!(&stored, raw),
        MessageResult::NotFound(meta) => panic!("{} not saved", meta),
    }
    assert_eq!(backend.v2.len().await, 1);
}
