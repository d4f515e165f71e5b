use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use quire_catalog::{demo, Book, BookMetadata, Catalog, KvCatalog};
use quire_ledger::{EntitlementLedger, KvLedger, PurchaseRecord};
use quire_purchase::{PurchaseFlow, WalletProvider};
use quire_store::{ContentStore, ContentUri, FileKv, InMemoryKv, KvContentStore, KvStore};
use quire_types::{Address, BookId};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::error::{SdkError, SdkResult};
use crate::profile::AuthorProfile;
use crate::reader::{Access, ReaderView};

/// One marketplace session.
///
/// Owns the content store, the catalog, and the entitlement ledger, all
/// sharing one key-value backend. Sessions do not coordinate with each
/// other; two sessions over the same directory must not run at once.
pub struct Marketplace {
    config: MarketConfig,
    kv: Arc<dyn KvStore>,
    content: Arc<dyn ContentStore>,
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn EntitlementLedger>,
}

impl Marketplace {
    /// A session whose state lives only in memory.
    pub fn in_memory(config: MarketConfig) -> SdkResult<Self> {
        let kv: Arc<dyn KvStore> = match config.storage_quota_bytes {
            Some(quota) => Arc::new(InMemoryKv::with_quota(quota)),
            None => Arc::new(InMemoryKv::new()),
        };
        Self::with_store(config, kv)
    }

    /// A session persisted under `config.data_dir`.
    pub fn open(config: MarketConfig) -> SdkResult<Self> {
        let kv = Arc::new(FileKv::open(&config.data_dir, config.storage_quota_bytes)?);
        info!(dir = %config.data_dir.display(), "marketplace opened");
        Self::with_store(config, kv)
    }

    /// A session over an existing backend.
    pub fn with_store(config: MarketConfig, kv: Arc<dyn KvStore>) -> SdkResult<Self> {
        let base = config.content_base()?;
        let market = Self {
            content: Arc::new(KvContentStore::new(Arc::clone(&kv), base)),
            catalog: Arc::new(KvCatalog::new(Arc::clone(&kv))),
            ledger: Arc::new(KvLedger::new(Arc::clone(&kv))),
            kv,
            config,
        };
        if market.config.seed_demo_books {
            market.seed_demo()?;
        }
        Ok(market)
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Total bytes held by the backend.
    pub fn used_bytes(&self) -> SdkResult<u64> {
        Ok(self.kv.used_bytes()?)
    }

    // ---- Content ----

    /// Store `bytes` under a fresh content id, bounded by the content write
    /// timeout.
    pub async fn upload(&self, name: &str, bytes: Vec<u8>) -> SdkResult<ContentUri> {
        let content = Arc::clone(&self.content);
        let file_name = name.to_string();
        let limit = self.config.timeouts.content_write();
        let write = tokio::task::spawn_blocking(move || content.store(&file_name, &bytes));
        let uri = match timeout(limit, write).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join)) => return Err(SdkError::Internal(format!("upload task failed: {join}"))),
            Err(_) => return Err(SdkError::Timeout(limit)),
        };
        info!(uri = %uri, "content uploaded");
        Ok(uri)
    }

    pub fn retrieve(&self, uri: &ContentUri) -> SdkResult<Vec<u8>> {
        debug!(uri = %uri, "content retrieve");
        Ok(self.content.retrieve(uri)?)
    }

    // ---- Catalog ----

    pub fn publish(&self, metadata: &BookMetadata, author: &Address) -> SdkResult<Book> {
        Ok(self.catalog.publish(metadata, author)?)
    }

    /// Publish the sample books if the catalog is empty.
    pub fn seed_demo(&self) -> SdkResult<Vec<Book>> {
        Ok(demo::seed_demo(self.catalog.as_ref())?)
    }

    pub fn books(&self) -> SdkResult<Vec<Book>> {
        Ok(self.catalog.list()?)
    }

    pub fn books_by_author(&self, author: &Address) -> SdkResult<Vec<Book>> {
        Ok(self.catalog.list_by_author(author)?)
    }

    pub fn book(&self, id: BookId) -> SdkResult<Book> {
        self.catalog.get(id)?.ok_or(SdkError::BookNotFound(id))
    }

    // ---- Entitlements ----

    pub fn has_purchased(&self, book: BookId, buyer: &Address) -> SdkResult<bool> {
        Ok(self.ledger.has_purchased(book, buyer)?)
    }

    /// Ownership of many books by one address, from a single ledger read.
    pub fn entitlements(
        &self,
        books: &[BookId],
        buyer: &Address,
    ) -> SdkResult<BTreeMap<BookId, bool>> {
        let owned: Vec<BookId> = self
            .ledger
            .purchases_by(buyer)?
            .into_iter()
            .map(|record| record.book_id)
            .collect();
        Ok(books
            .iter()
            .map(|id| (*id, owned.contains(id)))
            .collect())
    }

    pub fn purchases_by(&self, buyer: &Address) -> SdkResult<Vec<PurchaseRecord>> {
        Ok(self.ledger.purchases_by(buyer)?)
    }

    /// How `viewer` may access a book. Authorship wins over a purchase.
    pub fn access(&self, book: BookId, viewer: &Address) -> SdkResult<Access> {
        let book = self.book(book)?;
        self.access_to(&book, Some(viewer))
    }

    fn access_to(&self, book: &Book, viewer: Option<&Address>) -> SdkResult<Access> {
        let Some(viewer) = viewer else {
            return Ok(Access::Locked);
        };
        if book.is_authored_by(viewer) {
            Ok(Access::Owner)
        } else if self.ledger.has_purchased(book.id, viewer)? {
            Ok(Access::Purchased)
        } else {
            Ok(Access::Locked)
        }
    }

    /// Load a book for the reader. Without a viewer the book is locked.
    pub fn open_reader(&self, book: BookId, viewer: Option<&Address>) -> SdkResult<ReaderView> {
        let book = self.book(book)?;
        let access = self.access_to(&book, viewer)?;
        debug!(book = %book.id, access = %access, "reader opened");
        Ok(ReaderView::new(book, access))
    }

    // ---- Profiles ----

    pub fn author_profile(&self, address: &Address) -> SdkResult<AuthorProfile> {
        let published = self
            .catalog
            .list_by_author(address)?
            .into_iter()
            .map(|book| book.id)
            .collect();
        Ok(AuthorProfile::build(
            address.clone(),
            &self.config.default_profile,
            published,
        ))
    }

    // ---- Wallet and purchases ----

    /// Ask the wallet to connect and return the account.
    pub async fn connect(&self, wallet: &dyn WalletProvider) -> SdkResult<Address> {
        let account = wallet.request_accounts().await?;
        info!(account = %account, "wallet connected");
        Ok(account)
    }

    /// A fresh purchase flow bound to this session's ledger.
    pub fn purchase_flow(&self) -> PurchaseFlow {
        PurchaseFlow::new(Arc::clone(&self.ledger), self.config.timeouts.flow())
    }

    /// Buy a book with the wallet's connected account. A buyer who already
    /// owns the book gets `PurchaseError::AlreadyOwned` and is not charged.
    pub async fn purchase(
        &self,
        book: BookId,
        wallet: &dyn WalletProvider,
    ) -> SdkResult<PurchaseRecord> {
        let book = self.book(book)?;
        let flow = self.purchase_flow();
        Ok(flow.purchase(&book, wallet).await?)
    }
}

impl fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marketplace")
            .field("data_dir", &self.config.data_dir)
            .field("content_base_uri", &self.config.content_base_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quire_purchase::{MockBehavior, MockWallet, PurchaseError};
    use quire_store::{StoreError, StoreResult};

    use super::*;

    const AUTHOR: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const BUYER: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";
    const OTHER: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn market() -> Marketplace {
        Marketplace::in_memory(MarketConfig::default()).unwrap()
    }

    fn metadata(title: &str, price: &str) -> BookMetadata {
        BookMetadata::new(
            title,
            "D",
            "https://mock-ipfs.local/c0/cover.png",
            "https://mock-ipfs.local/b0/book.pdf",
            price.parse().unwrap(),
        )
    }

    #[test]
    fn publish_then_list() {
        let market = market();
        market.publish(&metadata("T", "1.5"), &addr(AUTHOR)).unwrap();
        let books = market.books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].price.to_string(), "1.5");
        assert_eq!(books[0].author.as_str(), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert!(books[0].published);
    }

    #[test]
    fn books_by_author_contains_each_book() {
        let market = market();
        let a = market.publish(&metadata("A", "1"), &addr(AUTHOR)).unwrap();
        let b = market.publish(&metadata("B", "1"), &addr(OTHER)).unwrap();
        assert!(market.books_by_author(&a.author).unwrap().contains(&a));
        assert_eq!(market.books_by_author(&b.author).unwrap(), vec![b]);
    }

    #[test]
    fn missing_book_is_not_found() {
        let market = market();
        assert!(matches!(
            market.book(BookId(42)).unwrap_err(),
            SdkError::BookNotFound(BookId(42))
        ));
        assert!(matches!(
            market.open_reader(BookId(42), None).unwrap_err(),
            SdkError::BookNotFound(_)
        ));
    }

    #[tokio::test]
    async fn upload_roundtrip() {
        let market = market();
        let data = vec![0u8, 1, 2, 254, 255];
        let uri = market.upload("cover.png", data.clone()).await.unwrap();
        assert!(uri.to_string().starts_with("https://mock-ipfs.local/"));
        assert!(uri.to_string().ends_with("/cover.png"));
        assert_eq!(market.retrieve(&uri).unwrap(), data);
    }

    #[tokio::test]
    async fn upload_over_quota_fails() {
        let config = MarketConfig {
            storage_quota_bytes: Some(4),
            ..Default::default()
        };
        let market = Marketplace::in_memory(config).unwrap();
        let err = market.upload("big.bin", vec![0; 64]).await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Store(StoreError::QuotaExceeded { .. })
        ));
    }

    struct SlowKv {
        inner: InMemoryKv,
        delay: Duration,
    }

    impl KvStore for SlowKv {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
            std::thread::sleep(self.delay);
            self.inner.put(key, value)
        }

        fn keys(&self) -> StoreResult<Vec<String>> {
            self.inner.keys()
        }

        fn used_bytes(&self) -> StoreResult<u64> {
            self.inner.used_bytes()
        }
    }

    #[tokio::test]
    async fn slow_upload_times_out() {
        let mut config = MarketConfig::default();
        config.timeouts.content_write_ms = 10;
        let kv = Arc::new(SlowKv {
            inner: InMemoryKv::new(),
            delay: Duration::from_millis(300),
        });
        let market = Marketplace::with_store(config, kv).unwrap();
        let err = market.upload("slow.txt", b"zzz".to_vec()).await.unwrap_err();
        assert!(matches!(err, SdkError::Timeout(_)));
    }

    #[tokio::test]
    async fn purchase_grants_access_to_buyer_only() {
        let market = market();
        let book = market.publish(&metadata("T", "1.5"), &addr(AUTHOR)).unwrap();
        let wallet = MockWallet::new(addr(BUYER));

        assert_eq!(market.connect(&wallet).await.unwrap(), addr(BUYER));
        assert!(!market.has_purchased(book.id, &addr(BUYER)).unwrap());
        market.purchase(book.id, &wallet).await.unwrap();

        assert!(market
            .has_purchased(BookId(1), &addr(&BUYER.to_lowercase()))
            .unwrap());
        assert!(!market.has_purchased(BookId(1), &addr(OTHER)).unwrap());
        assert_eq!(market.access(book.id, &addr(BUYER)).unwrap(), Access::Purchased);
        assert_eq!(market.access(book.id, &addr(OTHER)).unwrap(), Access::Locked);
        assert_eq!(market.access(book.id, &addr(AUTHOR)).unwrap(), Access::Owner);
    }

    #[tokio::test]
    async fn self_purchase_is_rejected() {
        let market = market();
        let book = market.publish(&metadata("T", "1"), &addr(AUTHOR)).unwrap();
        let wallet = MockWallet::connected(addr(AUTHOR));
        let err = market.purchase(book.id, &wallet).await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Purchase(PurchaseError::SelfPurchase { .. })
        ));
        assert!(wallet.transfers().is_empty());
    }

    #[tokio::test]
    async fn repeat_purchase_is_refused() {
        let market = market();
        let book = market.publish(&metadata("T", "1"), &addr(AUTHOR)).unwrap();
        let wallet = MockWallet::connected(addr(BUYER));
        market.purchase(book.id, &wallet).await.unwrap();

        let err = market.purchase(book.id, &wallet).await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Purchase(PurchaseError::AlreadyOwned { .. })
        ));
        assert_eq!(wallet.transfers().len(), 1);
        assert_eq!(market.purchases_by(&addr(BUYER)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_purchase_leaves_book_locked() {
        let market = market();
        let book = market.publish(&metadata("T", "1"), &addr(AUTHOR)).unwrap();
        let wallet = MockWallet::connected(addr(BUYER)).with_behavior(MockBehavior::Reject);
        let err = market.purchase(book.id, &wallet).await.unwrap_err();
        assert!(matches!(err, SdkError::Purchase(PurchaseError::UserRejected)));
        assert_eq!(market.access(book.id, &addr(BUYER)).unwrap(), Access::Locked);
    }

    #[tokio::test]
    async fn entitlements_batch() {
        let market = market();
        for i in 0..3 {
            market
                .publish(&metadata(&format!("B{i}"), "1"), &addr(AUTHOR))
                .unwrap();
        }
        let wallet = MockWallet::connected(addr(BUYER));
        market.purchase(BookId(2), &wallet).await.unwrap();

        let owned = market
            .entitlements(&[BookId(1), BookId(2), BookId(3)], &addr(BUYER))
            .unwrap();
        assert!(!owned[&BookId(1)]);
        assert!(owned[&BookId(2)]);
        assert!(!owned[&BookId(3)]);
    }

    #[tokio::test]
    async fn reader_reveals_content_only_with_access() {
        let market = market();
        let book = market.publish(&metadata("T", "1"), &addr(AUTHOR)).unwrap();

        let anonymous = market.open_reader(book.id, None).unwrap();
        assert_eq!(anonymous.access, Access::Locked);
        assert_eq!(anonymous.content_uri, None);
        assert_eq!(anonymous.author_display, "0xaaaa...aaaa");

        let owner = market.open_reader(book.id, Some(&addr(AUTHOR))).unwrap();
        assert_eq!(owner.access, Access::Owner);
        assert_eq!(owner.content_uri.as_deref(), Some(book.content_uri.as_str()));

        let wallet = MockWallet::connected(addr(BUYER));
        market.purchase(book.id, &wallet).await.unwrap();
        let buyer = market.open_reader(book.id, Some(&addr(BUYER))).unwrap();
        assert_eq!(buyer.access, Access::Purchased);
        assert!(buyer.content_uri.is_some());
    }

    #[test]
    fn author_profile_lists_published_books() {
        let market = market();
        market.publish(&metadata("A1", "1"), &addr(AUTHOR)).unwrap();
        market.publish(&metadata("C1", "1"), &addr(OTHER)).unwrap();
        market.publish(&metadata("A2", "1"), &addr(AUTHOR)).unwrap();

        let profile = market.author_profile(&addr(AUTHOR)).unwrap();
        assert_eq!(profile.published_books, vec![BookId(1), BookId(3)]);
        assert!(profile.is_registered);
        assert_eq!(profile.name, market.config().default_profile.name);

        let nobody = market.author_profile(&addr(BUYER)).unwrap();
        assert!(nobody.published_books.is_empty());
        assert!(!nobody.is_registered);
    }

    #[test]
    fn demo_seed_is_opt_in() {
        assert!(market().books().unwrap().is_empty());

        let config = MarketConfig {
            seed_demo_books: true,
            ..Default::default()
        };
        let market = Marketplace::in_memory(config).unwrap();
        let books = market.books().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "The Blockchain Revolution");
    }

    #[tokio::test]
    async fn file_session_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = MarketConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let uri = {
            let market = Marketplace::open(config.clone()).unwrap();
            let uri = market.upload("chapter.txt", b"Once upon a time".to_vec()).await.unwrap();
            market.publish(&metadata("Kept", "0.2"), &addr(AUTHOR)).unwrap();
            let wallet = MockWallet::connected(addr(BUYER));
            market.purchase(BookId(1), &wallet).await.unwrap();
            uri
        };

        let market = Marketplace::open(config).unwrap();
        assert_eq!(market.books().unwrap()[0].title, "Kept");
        assert!(market.has_purchased(BookId(1), &addr(BUYER)).unwrap());
        assert_eq!(market.retrieve(&uri).unwrap(), b"Once upon a time");
        assert!(market.used_bytes().unwrap() > 0);
    }
}
