use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

use magnus_types::{InvoiceId, PaymentStatus, VendorInvoice};
use magnus_view::{
    ActionKey, CollectionFetcher, CollectionStatus, DashboardController, DownloadOutcome,
    DownloadPayload, FetchError, FetchResult, MutationOutcome, NotificationSeverity, ViewPreset,
};

fn invoice(id: &str, vendor: &str, amount: rust_decimal::Decimal) -> VendorInvoice {
    VendorInvoice {
        invoice_id: InvoiceId::from(id),
        vendor: vendor.to_string(),
        amount,
        status: PaymentStatus::Pending,
        issued_at: Utc::now(),
    }
}

/// Fetcher backed by a mutable in-memory backend, so mutations can change
/// what the next refresh returns
struct FakeBackend {
    invoices: Mutex<Vec<VendorInvoice>>,
    fail_next: Mutex<bool>,
}

impl FakeBackend {
    fn with_invoices(invoices: Vec<VendorInvoice>) -> Arc<Self> {
        Arc::new(Self {
            invoices: Mutex::new(invoices),
            fail_next: Mutex::new(false),
        })
    }

    fn fail_next_fetch(&self) {
        *self.fail_next.lock() = true;
    }

    fn remove(&self, id: &str) {
        self.invoices.lock().retain(|i| i.invoice_id.as_str() != id);
    }

    fn approve_ok(&self, id: &str) -> Result<MutationOutcome, FetchError> {
        self.remove(id);
        Ok(MutationOutcome {
            success: true,
            message: format!("Payment {id} approved"),
            data: None,
        })
    }
}

#[async_trait]
impl CollectionFetcher<VendorInvoice> for FakeBackend {
    async fn fetch(&self) -> FetchResult<Vec<VendorInvoice>> {
        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(FetchError::Transport("502 bad gateway".to_string()));
        }
        Ok(self.invoices.lock().clone())
    }
}

fn controller_with(backend: &Arc<FakeBackend>) -> DashboardController<VendorInvoice> {
    let fetcher: Arc<dyn CollectionFetcher<VendorInvoice>> = backend.clone();
    DashboardController::new(ViewPreset::APPROVALS, fetcher)
}

#[tokio::test]
async fn approve_refreshes_and_prunes_selection() {
    let backend = FakeBackend::with_invoices(vec![
        invoice("INV-1", "Acme Metals", dec!(72000)),
        invoice("INV-2", "Blue Freight", dec!(18000)),
    ]);
    let controller = controller_with(&backend);
    controller.hydrate().await;

    controller.toggle_selected("INV-1");
    controller.toggle_selected("INV-2");

    let ok = controller
        .run_action("approve", "INV-1", async { backend.approve_ok("INV-1") })
        .await;
    assert!(ok);

    // The approved row left the backend snapshot; projection prunes it
    // from both the table and the selection.
    let projection = controller.projection();
    assert_eq!(projection.total, 1);
    assert_eq!(projection.rows[0].invoice_id, InvoiceId::from("INV-2"));
    assert_eq!(controller.selection().ids(), vec!["INV-2".to_string()]);

    let key = ActionKey::new("approve", "INV-1");
    assert!(!controller.is_pending(&key));
}

#[tokio::test]
async fn business_rejection_leaves_state_untouched() {
    let backend = FakeBackend::with_invoices(vec![invoice("INV-1", "Acme Metals", dec!(72000))]);
    let controller = controller_with(&backend);
    controller.hydrate().await;
    controller.toggle_selected("INV-1");

    let notifications = controller.notifications();
    let op = async {
        Ok::<_, FetchError>(MutationOutcome {
            success: false,
            message: "approval window closed".to_string(),
            data: None,
        })
    };
    let ok = controller.run_action("approve", "INV-1", op).await;
    assert!(!ok);

    assert_eq!(controller.projection().total, 1);
    assert!(controller.selection().contains("INV-1"));

    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.severity, NotificationSeverity::Error);
    assert_eq!(notification.message, "approval window closed");
    assert!(!controller.is_pending(&ActionKey::new("approve", "INV-1")));
}

#[tokio::test]
async fn transport_failure_settles_key_and_notifies() {
    let backend = FakeBackend::with_invoices(vec![invoice("INV-1", "Acme Metals", dec!(72000))]);
    let controller = controller_with(&backend);
    controller.hydrate().await;

    let notifications = controller.notifications();
    let op = async {
        Err::<MutationOutcome, FetchError>(FetchError::Transport("timeout".to_string()))
    };
    assert!(!controller.run_action("retry", "INV-1", op).await);

    assert!(!controller.is_pending(&ActionKey::new("retry", "INV-1")));
    assert_eq!(
        notifications.try_recv().unwrap().severity,
        NotificationSeverity::Error
    );
}

#[tokio::test]
async fn bulk_approve_clears_selection_and_refreshes() {
    let backend = FakeBackend::with_invoices(vec![
        invoice("INV-1", "Acme Metals", dec!(72000)),
        invoice("INV-2", "Blue Freight", dec!(18000)),
        invoice("INV-3", "Crest Logistics", dec!(9000)),
    ]);
    let controller = controller_with(&backend);
    controller.hydrate().await;

    controller.select_all_visible();
    assert_eq!(controller.selection().len(), 3);

    let ids = controller.selection().ids();
    let op = async {
        for id in &ids {
            backend.remove(id);
        }
        Ok::<_, FetchError>(MutationOutcome {
            success: true,
            message: format!("{} payments approved", ids.len()),
            data: None,
        })
    };
    assert!(controller.run_bulk("bulk-approve", op).await);

    assert!(controller.selection().is_empty());
    assert_eq!(controller.projection().total, 0);
}

#[tokio::test]
async fn poll_failure_keeps_last_known_good_snapshot() {
    let backend = FakeBackend::with_invoices(vec![
        invoice("INV-1", "Acme Metals", dec!(72000)),
        invoice("INV-2", "Blue Freight", dec!(18000)),
    ]);
    let controller = controller_with(&backend);
    controller.hydrate().await;
    assert_eq!(controller.status(), CollectionStatus::Loaded);

    backend.fail_next_fetch();
    controller.clear_data().await;

    assert_eq!(controller.status(), CollectionStatus::Error);
    let collection = controller.collection();
    assert_eq!(collection.items.unwrap().len(), 2);
    assert!(collection.last_error.unwrap().contains("502"));
}

#[tokio::test(start_paused = true)]
async fn interval_poll_picks_up_backend_changes() {
    let backend = FakeBackend::with_invoices(vec![
        invoice("INV-1", "Acme Metals", dec!(72000)),
        invoice("INV-2", "Blue Freight", dec!(18000)),
    ]);
    let controller = Arc::new(controller_with(&backend));
    controller.hydrate().await;
    controller.start_polling();
    tokio::task::yield_now().await;

    backend.remove("INV-1");
    tokio::time::advance(ViewPreset::APPROVALS.poll_interval).await;
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    assert_eq!(controller.projection().total, 1);

    controller.stop_polling();
    backend.remove("INV-2");
    tokio::time::advance(ViewPreset::APPROVALS.poll_interval).await;
    tokio::task::yield_now().await;

    // Poll stopped; the view keeps the last snapshot until a manual refresh.
    assert_eq!(controller.projection().total, 1);
}

#[tokio::test]
async fn download_returns_payload_without_refreshing() {
    let backend = FakeBackend::with_invoices(vec![invoice("INV-1", "Acme Metals", dec!(72000))]);
    let controller = controller_with(&backend);
    controller.hydrate().await;

    let op = async {
        Ok::<_, FetchError>(DownloadOutcome {
            success: true,
            message: None,
            data: Some(DownloadPayload {
                content: "invoice_id,amount\nINV-1,72000".to_string(),
                content_type: "text/csv".to_string(),
                filename: "approvals.csv".to_string(),
            }),
        })
    };
    let payload = controller.run_download("download", "INV-1", op).await.unwrap();
    assert_eq!(payload.content_type, "text/csv");
    assert_eq!(payload.filename, "approvals.csv");
}

#[tokio::test]
async fn search_and_pagination_compose() {
    let invoices: Vec<VendorInvoice> = (0..20)
        .map(|i| invoice(&format!("INV-{i:02}"), "Acme Metals", dec!(1000)))
        .collect();
    let backend = FakeBackend::with_invoices(invoices);
    let controller = controller_with(&backend);
    controller.hydrate().await;

    let first = controller.projection();
    assert_eq!(first.total, 20);
    assert_eq!(first.rows.len(), 8);
    assert_eq!(first.page_count, 3);

    controller.set_page(99);
    let last = controller.projection();
    assert_eq!(last.page, 3);
    assert_eq!(last.rows.len(), 4);

    controller.set_query("INV-1");
    let searched = controller.projection();
    // INV-10..INV-19 plus nothing else matches the prefix; page reset to 1.
    assert_eq!(searched.total, 10);
    assert_eq!(searched.page, 1);
}
