pub mod constants;
pub mod errors;
pub mod helpers;
pub mod options;
pub mod pipeline;
pub mod store;
pub mod telemetry;
pub mod types;

pub use errors::{Error, Result, Stage};
pub use helpers::{derive_subnet_key, mask_to_prefix};
pub use options::Options;
pub use store::SubnetStore;
pub use types::{DelegationRecord, IpFamily, PopulateReport};

use constants::UNKNOWN_COUNTRY;
use log::{debug, warn};
use metrics::counter;
use once_cell::sync::OnceCell;
use std::net::IpAddr;
use std::sync::Arc;
use telemetry::{LOOKUPS, LOOKUP_HITS, LOOKUP_INVALID, STORE_READ_ERRORS};

/// Process-wide entry point: owns the store and the configuration.
///
/// Lookups take `&self` and may run from any number of threads, also
/// while a population run is writing.
pub struct Handler {
    store: Arc<SubnetStore>,
    opts: Options,
}

impl Handler {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            // Fallback only; a host that installed its own logger wins.
            let _ = env_logger::builder()
                .format_timestamp(None)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    /// Open (or create) the store named by `opts.db_path`.
    pub fn open(opts: Options) -> Result<Self> {
        Self::ensure_logging();
        telemetry::describe();
        let store = SubnetStore::open(&opts.db_path)?;
        Ok(Self {
            store: Arc::new(store),
            opts,
        })
    }

    /// Drop this handle's reference to the store. The file stays open
    /// until loaders of a cancelled `populate_data` have finished too.
    pub fn close(self) {
        debug!("[CLOSE] {}", self.store.path().display());
        drop(self);
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn store(&self) -> &SubnetStore {
        &self.store
    }

    /// Country code of the most specific stored subnet containing `ip`,
    /// or `"NA"` when there is none or `ip` is not an address.
    pub fn lookup(&self, ip: &str) -> String {
        self.locate(ip)
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_owned())
    }

    /// Like `lookup`, with the unknown case as `None`.
    ///
    /// Probes the family's partition once per prefix length, from /0 up to
    /// the full width, keeping the last hit: the longest match wins.
    /// A failed probe counts as a miss at that length.
    pub fn locate(&self, ip: &str) -> Option<String> {
        counter!(LOOKUPS).increment(1);
        let addr = match ip.parse::<IpAddr>() {
            // `::ffff:a.b.c.d` resolves against the ipv4 partition
            Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
            Ok(addr) => addr,
            Err(_) => {
                counter!(LOOKUP_INVALID).increment(1);
                return None;
            }
        };
        let family = IpFamily::of(&addr);

        let mut country = None;
        for plen in 0..=family.bits() {
            let Some(key) = mask_to_prefix(addr, plen) else {
                continue;
            };
            match self.store.get(family, &key) {
                Ok(Some(found)) => country = Some(found),
                Ok(None) => {}
                Err(e) => {
                    counter!(STORE_READ_ERRORS).increment(1);
                    warn!("failed to get key {key}: {e}");
                }
            }
        }

        if country.is_some() {
            counter!(LOOKUP_HITS).increment(1);
        }
        country
    }

    /// Download every configured RIR file (unless disabled) and load it
    /// into the store. Fails with the first error of the first failing
    /// stage; later stages do not start.
    pub async fn populate_data(&self) -> Result<PopulateReport> {
        pipeline::populate(&self.store, &self.opts).await
    }
}
