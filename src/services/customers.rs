// Customers service — create/update/delete against the remote store, plus
// the one-shot reload. None of these touch the local snapshot directly:
// the change feed is the only writer, so a mutation becomes visible only
// when the next push echoes it back.

use chrono::Utc;

use crate::error::StoreError;
use crate::mask::mask_name;
use crate::notify::{Confirm, Notifier};
use crate::render::Render;
use crate::services::dashboard;
use crate::state::AppState;
use crate::store::DocumentStore;
use crate::types::{CustomerFilter, CustomerInput, CustomerRecord, CustomerUpdate};
use crate::util::format_amount;

/// Validated form input: trimmed name plus the parsed amount.
struct ValidInput {
    name: String,
    salesperson: String,
    amount: i64,
}

/// Pre-flight validation, shared by create and update. All required fields
/// are checked before anything is sent to the remote store.
fn validate(input: &CustomerInput) -> Result<ValidInput, StoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("請輸入客戶姓名".to_string()));
    }
    let salesperson = input.salesperson.trim();
    if salesperson.is_empty() {
        return Err(StoreError::Validation("請選擇業務人員".to_string()));
    }
    let amount: i64 = input
        .amount
        .trim()
        .parse()
        .map_err(|_| StoreError::Validation("金額必須是整數".to_string()))?;
    if amount < 0 {
        return Err(StoreError::Validation("金額不可為負數".to_string()));
    }
    Ok(ValidInput {
        name: name.to_string(),
        salesperson: salesperson.to_string(),
        amount,
    })
}

/// Create a customer order in the remote store.
///
/// The snapshot is untouched here; the new record shows up when the feed
/// pushes it back. Failures become exactly one toast and are not retried.
pub async fn create_customer(
    state: &AppState,
    store: &dyn DocumentStore,
    notifier: &dyn Notifier,
    input: &CustomerInput,
) {
    let valid = match validate(input) {
        Ok(v) => v,
        Err(e) => {
            notifier.notify(&e.user_message("新增客戶"), true);
            return;
        }
    };

    let record = CustomerRecord {
        id: String::new(), // assigned by the store
        masked_name: mask_name(&valid.name),
        name: valid.name,
        salesperson: valid.salesperson,
        order_month: input.order_month,
        product_type: input.product_type.clone(),
        amount: valid.amount,
        seq: Some(state.next_seq()),
        created_at: Utc::now().to_rfc3339(),
        updated_at: None,
    };

    match store.create(&record).await {
        Ok(id) => {
            log::info!("customer created: {}", id);
            notifier.notify("客戶新增成功！", false);
        }
        Err(e) => {
            log::error!("customer create failed: {}", e);
            notifier.notify(&e.user_message("新增客戶"), true);
        }
    }
}

/// Rebuild a customer's full field set in the remote store.
///
/// No local lookup and no partial patching: the update carries every form
/// field plus a fresh `updatedAt`, keyed purely by the store-assigned id.
pub async fn update_customer(
    store: &dyn DocumentStore,
    notifier: &dyn Notifier,
    id: &str,
    input: &CustomerInput,
) {
    let valid = match validate(input) {
        Ok(v) => v,
        Err(e) => {
            notifier.notify(&e.user_message("更新客戶"), true);
            return;
        }
    };

    let update = CustomerUpdate {
        masked_name: mask_name(&valid.name),
        name: valid.name,
        salesperson: valid.salesperson,
        order_month: input.order_month,
        product_type: input.product_type.clone(),
        amount: valid.amount,
        updated_at: Utc::now().to_rfc3339(),
    };

    match store.update(id, &update).await {
        Ok(()) => {
            log::info!("customer updated: {}", id);
            notifier.notify("客戶資料更新成功！", false);
        }
        Err(e) => {
            log::error!("customer update failed for {}: {}", id, e);
            notifier.notify(&e.user_message("更新客戶"), true);
        }
    }
}

/// Delete a customer order after two confirmations.
///
/// An id absent from the local snapshot is a silent no-op: no remote call,
/// no prompt, no toast. The second confirmation shows the identifying
/// fields so the user can verify before an irreversible action.
pub async fn delete_customer(
    state: &AppState,
    store: &dyn DocumentStore,
    notifier: &dyn Notifier,
    confirm: &dyn Confirm,
    id: &str,
) {
    let Some(customer) = state.find(id) else {
        return;
    };

    if !confirm.confirm("確定要刪除這筆客戶資料嗎？") {
        return;
    }

    let detail = format!(
        "請再次確認刪除以下客戶資料：\n\n\
         客戶：{}\n\
         業務：{}\n\
         月份：{}\n\
         商品：{}\n\
         金額：{}萬元\n\n\
         刪除後無法復原，確定要繼續嗎？",
        customer.masked_name,
        customer.salesperson,
        customer.order_month.label(),
        customer.product_type.as_str(),
        format_amount(customer.amount),
    );
    if !confirm.confirm(&detail) {
        return;
    }

    match store.delete(id).await {
        Ok(()) => {
            log::info!("customer deleted: {}", id);
            notifier.notify("客戶資料已刪除！", false);
        }
        Err(e) => {
            log::error!("customer delete failed for {}: {}", id, e);
            notifier.notify(&e.user_message("刪除客戶"), true);
        }
    }
}

/// One-shot full reload: fetch the whole collection and replace the
/// snapshot the same way a feed push would. Used at startup before the
/// feed is confirmed live and for manual refresh. On failure the
/// last-known-good snapshot stays up.
pub async fn reload(
    state: &AppState,
    store: &dyn DocumentStore,
    notifier: &dyn Notifier,
    render: &dyn Render,
) {
    match store.fetch_all().await {
        Ok(records) => {
            log::info!("reload: {} records", records.len());
            state.replace_snapshot(records);
            render.render(&dashboard::view(state, &CustomerFilter::default()));
        }
        Err(e) => {
            log::error!("reload failed: {}", e);
            notifier.notify(&e.user_message("重新載入"), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::store::memory::{FailKind, MemoryStore};
    use crate::store::DocumentStore;
    use crate::types::{DashboardView, Period, ProductType, SalesTargets};

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<(String, bool)>>);

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, is_error: bool) {
            self.0.lock().unwrap().push((message.to_string(), is_error));
        }
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<(String, bool)> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Answers prompts from a script and records every message shown.
    struct ScriptedConfirm {
        answers: Mutex<Vec<bool>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedConfirm {
        fn new(answers: &[bool]) -> Self {
            let mut reversed: Vec<bool> = answers.to_vec();
            reversed.reverse();
            Self {
                answers: Mutex::new(reversed),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm(&self, message: &str) -> bool {
            self.seen.lock().unwrap().push(message.to_string());
            self.answers.lock().unwrap().pop().unwrap_or(false)
        }
    }

    #[derive(Default)]
    struct CountingRender(AtomicUsize);

    impl Render for CountingRender {
        fn render(&self, _view: &DashboardView) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn input(name: &str, amount: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            salesperson: "麗鳳".to_string(),
            order_month: Period::Dec2025,
            product_type: ProductType::Finance,
            amount: amount.to_string(),
        }
    }

    fn state() -> AppState {
        AppState::new(SalesTargets::default_table())
    }

    #[tokio::test]
    async fn create_persists_but_snapshot_waits_for_the_push() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();

        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;

        let stored = store.fetch_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].masked_name, "王O明");
        assert_eq!(stored[0].amount, 300);
        assert_eq!(stored[0].seq, Some(1));
        assert!(!stored[0].created_at.is_empty());
        assert_eq!(stored[0].updated_at, None);
        assert_eq!(
            notifier.messages(),
            vec![("客戶新增成功！".to_string(), false)]
        );
        // Eventual consistency: the local snapshot only moves on a push
        assert!(state.snapshot().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_before_any_remote_call() {
        let state = state();
        let store = MemoryStore::new();

        for (bad_input, expected) in [
            (input("   ", "300"), "請輸入客戶姓名"),
            (
                CustomerInput {
                    salesperson: "".to_string(),
                    ..input("王小明", "300")
                },
                "請選擇業務人員",
            ),
            (input("王小明", "三百"), "金額必須是整數"),
            (input("王小明", "-5"), "金額不可為負數"),
        ] {
            let notifier = RecordingNotifier::default();
            create_customer(&state, &store, &notifier, &bad_input).await;
            assert_eq!(notifier.messages(), vec![(expected.to_string(), true)]);
        }
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_failures_notify_by_class() {
        let state = state();
        let store = MemoryStore::new();

        let notifier = RecordingNotifier::default();
        store.fail_next(FailKind::Network);
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;
        assert_eq!(
            notifier.messages(),
            vec![("新增客戶失敗，請檢查網路連線".to_string(), true)]
        );

        let notifier = RecordingNotifier::default();
        store.fail_next(FailKind::PermissionDenied);
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;
        assert_eq!(
            notifier.messages(),
            vec![("新增客戶失敗，沒有存取權限".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn update_rebuilds_the_full_field_set() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;
        let id = store.fetch_all().await.unwrap()[0].id.clone();

        let edited = CustomerInput {
            product_type: ProductType::Insurance,
            ..input("王大明", "500")
        };
        update_customer(&store, &notifier, &id, &edited).await;

        let stored = store.fetch_all().await.unwrap();
        assert_eq!(stored[0].name, "王大明");
        assert_eq!(stored[0].masked_name, "王O明");
        assert_eq!(stored[0].product_type, ProductType::Insurance);
        assert_eq!(stored[0].amount, 500);
        assert!(stored[0].updated_at.is_some());
        assert_eq!(
            notifier.messages().last().unwrap().0,
            "客戶資料更新成功！"
        );
    }

    #[tokio::test]
    async fn delete_unknown_id_is_a_silent_noop() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let confirm = ScriptedConfirm::new(&[true, true]);

        // If the operation reached the store, this injected failure would
        // fire; it staying armed proves no remote call was made.
        store.fail_next(FailKind::Network);
        delete_customer(&state, &store, &notifier, &confirm, "missing-id").await;

        assert!(notifier.messages().is_empty());
        assert!(confirm.prompts().is_empty());
        assert!(store.fetch_all().await.is_err());
    }

    #[tokio::test]
    async fn delete_needs_both_confirmations() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;
        let stored = store.fetch_all().await.unwrap();
        state.replace_snapshot(stored.clone());
        let id = stored[0].id.clone();

        // Declining the second prompt aborts
        let confirm = ScriptedConfirm::new(&[true, false]);
        delete_customer(&state, &store, &notifier, &confirm, &id).await;
        assert_eq!(confirm.prompts().len(), 2);
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);

        // Declining the first prompt never shows the second
        let confirm = ScriptedConfirm::new(&[false]);
        delete_customer(&state, &store, &notifier, &confirm, &id).await;
        assert_eq!(confirm.prompts().len(), 1);
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);

        // Accepting both deletes, and the second prompt identifies the record
        let confirm = ScriptedConfirm::new(&[true, true]);
        delete_customer(&state, &store, &notifier, &confirm, &id).await;
        let detail = &confirm.prompts()[1];
        assert!(detail.contains("王O明"));
        assert!(detail.contains("麗鳳"));
        assert!(detail.contains("2025年12月"));
        assert!(detail.contains("理財"));
        assert!(detail.contains("300萬元"));
        assert!(store.fetch_all().await.unwrap().is_empty());
        assert_eq!(notifier.messages().last().unwrap().0, "客戶資料已刪除！");
    }

    #[tokio::test]
    async fn reload_replaces_snapshot_and_renders() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let render = CountingRender::default();
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;

        reload(&state, &store, &notifier, &render).await;
        assert_eq!(state.snapshot().len(), 1);
        assert_eq!(render.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reload_failure_keeps_last_known_good() {
        let state = state();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let render = CountingRender::default();
        create_customer(&state, &store, &notifier, &input("王小明", "300")).await;
        reload(&state, &store, &notifier, &render).await;

        store.fail_next(FailKind::Network);
        reload(&state, &store, &notifier, &render).await;
        // Stale but available
        assert_eq!(state.snapshot().len(), 1);
        assert_eq!(render.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            notifier.messages().last().unwrap(),
            &("重新載入失敗，請檢查網路連線".to_string(), true)
        );
    }
}
