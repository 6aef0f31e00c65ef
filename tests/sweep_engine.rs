//! End-to-end sweep behaviour against in-memory networks.

use alloy::primitives::U256;
use std::sync::Arc;

use wallet_sweeper::blockchain::{ErrorKind, FeeParameters};
use wallet_sweeper::config::SweepConfig;
use wallet_sweeper::lifecycle::Shutdown;
use wallet_sweeper::registry::NetworkProfile;
use wallet_sweeper::report::{load_report, NetworkStatus, OutcomeStatus, ReportStore};
use wallet_sweeper::sweep::{survey_balances, SweepEngine, SweepError, SweepRun};
use wallet_sweeper::Account;

mod common;
use common::{account, destination, profile, settings, temp_dir, MockConnector, MockNetwork, ReceiptMode};

async fn run_sweep(
    connector: Arc<MockConnector>,
    settings: SweepConfig,
    networks: &[NetworkProfile],
    accounts: &[Account],
) -> SweepRun {
    let engine = SweepEngine::new(connector, settings, destination(), Shutdown::new());
    engine
        .run(networks, accounts, ReportStore::new(temp_dir()))
        .await
        .expect("sweep run")
}

fn cleanup(run: &SweepRun) {
    if let Some(dir) = run.path.parent() {
        std::fs::remove_dir_all(dir).unwrap_or_default();
    }
}

#[tokio::test]
async fn test_empty_and_funded_accounts() {
    // gas price 1 wei * 21 units = fee of 21 wei
    let network = MockNetwork::new(1);
    let a = account(1, 0xa);
    let b = account(2, 0xb);
    network.set_balance(a.address, 0);
    network.set_balance(b.address, 100);

    let connector = MockConnector::new();
    connector.add(97, network.clone());

    let run = run_sweep(connector, settings(21), &[profile("Testnet", 97)], &[a, b]).await;
    let result = &run.report.network_results[0];

    assert_eq!(result.status, NetworkStatus::Completed);
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[0].status, OutcomeStatus::Empty);
    assert_eq!(result.outcomes[0].amount, U256::ZERO);
    assert!(result.outcomes[0].tx_hash.is_none());

    let swept = &result.outcomes[1];
    assert_eq!(swept.status, OutcomeStatus::Success);
    assert_eq!(swept.balance, Some(U256::from(100u64)));
    assert_eq!(swept.fee_cost, Some(U256::from(21u64)));
    assert_eq!(swept.amount, U256::from(79u64));
    let tx_hash = swept.tx_hash.expect("tx hash");
    assert_eq!(swept.explorer_url.as_deref(), Some(format!("https://scan.test/tx/{}", tx_hash).as_str()));
    assert!(swept.block_number.is_some());

    assert_eq!(result.wallets_with_balance, 1);
    assert_eq!(result.total_swept, U256::from(79u64));

    let submitted = network.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].request.to, destination());
    assert_eq!(submitted[0].request.value, U256::from(79u64));
    assert_eq!(network.balance(destination()), U256::from(79u64));

    cleanup(&run);
}

#[tokio::test]
async fn test_balance_below_fee_is_not_submitted() {
    let network = MockNetwork::new(1);
    let poor = account(1, 0x15);
    network.set_balance(poor.address, 15);
    let exact = account(2, 0x21);
    network.set_balance(exact.address, 21);

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let run = run_sweep(connector, settings(21), &[profile("Net", 1)], &[poor, exact]).await;
    let result = &run.report.network_results[0];

    for outcome in &result.outcomes {
        assert_eq!(outcome.status, OutcomeStatus::InsufficientForGas);
        assert_eq!(outcome.amount, U256::ZERO);
        assert!(outcome.tx_hash.is_none());
    }
    assert_eq!(result.wallets_with_balance, 2);
    assert!(network.submitted().is_empty());

    cleanup(&run);
}

#[tokio::test]
async fn test_unreachable_network_does_not_stop_others() {
    let first = MockNetwork::new(1);
    let third = MockNetwork::new(1);
    let acct = account(1, 0x01);
    first.set_balance(acct.address, 50);
    third.set_balance(acct.address, 60);

    let connector = MockConnector::new();
    connector.add(1, first);
    connector.add(3, third);
    connector.set_unreachable(2);

    let networks = vec![profile("First", 1), profile("Down", 2), profile("Third", 3)];
    let run = run_sweep(connector, settings(21), &networks, &[acct]).await;

    let names: Vec<&str> = run.report.network_results.iter().map(|n| n.network_name.as_str()).collect();
    assert_eq!(names, vec!["First", "Down", "Third"]);
    assert_eq!(run.report.network_results.len(), run.report.total_networks);

    let down = &run.report.network_results[1];
    assert_eq!(down.status, NetworkStatus::ConnectionFailed);
    assert!(down.connection_error.as_deref().unwrap_or("").contains("refused"));
    assert!(down.outcomes.is_empty());
    // Every transient attempt but the last is kept on the record.
    assert_eq!(down.scan_errors.len(), 2);

    assert_eq!(run.report.network_results[0].total_swept, U256::from(29u64));
    assert_eq!(run.report.network_results[2].total_swept, U256::from(39u64));

    cleanup(&run);
}

#[tokio::test]
async fn test_chain_mismatch_is_not_retried() {
    let connector = MockConnector::new();
    connector.set_mismatched(5);

    let run = run_sweep(connector.clone(), settings(21), &[profile("Wrong", 5)], &[account(1, 1)]).await;
    let result = &run.report.network_results[0];

    assert_eq!(result.status, NetworkStatus::ConnectionFailed);
    assert!(result.scan_errors.is_empty());
    assert_eq!(connector.connects(), 1);

    cleanup(&run);
}

#[tokio::test]
async fn test_transient_head_failures_recovered() {
    let network = MockNetwork::new(1);
    let acct = account(1, 0x01);
    network.set_balance(acct.address, 100);
    network.fail_head_queries(2);

    let connector = MockConnector::new();
    connector.add(1, network);

    let run = run_sweep(connector.clone(), settings(21), &[profile("Flaky", 1)], &[acct]).await;
    let result = &run.report.network_results[0];

    assert_eq!(result.status, NetworkStatus::Completed);
    assert_eq!(result.scan_errors.len(), 2);
    assert!(result.scan_errors[0].contains("connection reset"));
    assert_eq!(result.count(OutcomeStatus::Success), 1);
    assert_eq!(connector.connects(), 3);

    cleanup(&run);
}

#[tokio::test]
async fn test_balance_failure_isolated_to_account() {
    let network = MockNetwork::new(1);
    let broken = account(1, 0x0b);
    let healthy = account(2, 0x0c);
    network.set_balance(broken.address, 500);
    network.set_balance(healthy.address, 500);
    network.fail_balance_of(broken.address);

    let other = MockNetwork::new(1);
    other.set_balance(broken.address, 100);

    let connector = MockConnector::new();
    connector.add(1, network);
    connector.add(2, other);

    let networks = vec![profile("One", 1), profile("Two", 2)];
    let run = run_sweep(connector, settings(21), &networks, &[broken, healthy]).await;

    let one = &run.report.network_results[0];
    assert_eq!(one.outcomes[0].status, OutcomeStatus::Error);
    assert!(one.outcomes[0].balance.is_none());
    assert_eq!(one.outcomes[0].error_kind, Some(ErrorKind::Rpc));
    assert_eq!(one.outcomes[1].status, OutcomeStatus::Success);
    assert_eq!(one.total_swept, U256::from(479u64));

    let two = &run.report.network_results[1];
    assert_eq!(two.outcomes[0].status, OutcomeStatus::Success);
    assert_eq!(two.outcomes[1].status, OutcomeStatus::Empty);

    cleanup(&run);
}

#[tokio::test]
async fn test_fee_query_failure_is_account_error() {
    let network = MockNetwork::new(1);
    let acct = account(1, 0x01);
    network.set_balance(acct.address, 100);
    network.fail_fee_queries();

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let run = run_sweep(connector, settings(21), &[profile("Net", 1)], &[acct]).await;
    let outcome = &run.report.network_results[0].outcomes[0];

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.balance, Some(U256::from(100u64)));
    assert!(outcome.fee_cost.is_none());
    assert_eq!(outcome.error_kind, Some(ErrorKind::Timeout));
    assert!(network.submitted().is_empty());
    assert_eq!(run.report.network_results[0].status, NetworkStatus::Completed);

    cleanup(&run);
}

#[tokio::test]
async fn test_rejected_submission_is_account_error() {
    let network = MockNetwork::new(1);
    let refused = account(1, 0x11);
    let next = account(2, 0x12);
    network.set_balance(refused.address, 100);
    network.set_balance(next.address, 50);
    network.reject_submissions_from(refused.address);

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let mut config = settings(21);
    config.max_concurrent_accounts = 1;
    let run = run_sweep(connector, config, &[profile("Net", 1)], &[refused, next]).await;
    let result = &run.report.network_results[0];

    let outcome = &result.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.error_kind, Some(ErrorKind::InsufficientFunds));
    assert_eq!(outcome.balance, Some(U256::from(100u64)));
    assert_eq!(outcome.fee_cost, Some(U256::from(21u64)));
    assert_eq!(outcome.amount, U256::ZERO);
    assert!(outcome.tx_hash.is_none());
    assert!(outcome.explorer_url.is_none());
    assert!(outcome.error.as_deref().unwrap_or_default().contains("insufficient funds"));

    assert_eq!(result.outcomes[1].status, OutcomeStatus::Success);
    assert_eq!(result.outcomes[1].amount, U256::from(29u64));
    assert_eq!(result.total_swept, U256::from(29u64));
    assert_eq!(result.status, NetworkStatus::Completed);
    assert_eq!(network.submitted().len(), 1);

    cleanup(&run);
}

#[tokio::test]
async fn test_report_on_disk_while_later_account_in_flight() {
    let network = MockNetwork::new(1);
    let swept = account(1, 0x21);
    let stuck = account(2, 0x22);
    network.set_balance(swept.address, 100);
    network.set_balance(stuck.address, 100);
    network.hang_balance_of(stuck.address);

    let connector = MockConnector::new();
    connector.add(1, network);

    let mut config = settings(21);
    config.max_concurrent_accounts = 1;
    let dir = temp_dir();
    let store = ReportStore::new(&dir);
    let path = store.path().to_path_buf();
    let engine = SweepEngine::new(connector, config, destination(), Shutdown::new());
    let accounts = [swept, stuck];
    let networks = [profile("Net", 1)];

    let run = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        engine.run(&networks, &accounts, store),
    )
    .await;
    assert!(run.is_err(), "second account never answers, so the run cannot finish");

    let on_disk = load_report(&path).expect("checkpoint written before the run finished");
    assert!(on_disk.finished_at.is_none());
    let result = &on_disk.network_results[0];
    assert_eq!(result.status, NetworkStatus::InProgress);
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].wallet_id, 1);
    assert_eq!(result.outcomes[0].status, OutcomeStatus::Success);
    assert!(result.outcomes[0].tx_hash.is_some());
    assert_eq!(result.total_swept, U256::from(79u64));

    std::fs::remove_dir_all(&dir).unwrap_or_default();
}

#[tokio::test]
async fn test_second_run_finds_everything_empty() {
    let network = MockNetwork::new(2);
    let accounts = vec![account(1, 0x01), account(2, 0x02), account(3, 0x03)];
    network.set_balance(accounts[0].address, 1_000);
    network.set_balance(accounts[1].address, 43);
    network.set_balance(accounts[2].address, 0);

    let connector = MockConnector::new();
    connector.add(1, network);
    let networks = vec![profile("Net", 1)];

    let first = run_sweep(connector.clone(), settings(21), &networks, &accounts).await;
    // fee = 2 * 21 = 42
    assert_eq!(first.report.network_results[0].total_swept, U256::from(958u64 + 1));
    assert_eq!(first.report.successful_transfers(), 2);

    let second = run_sweep(connector, settings(21), &networks, &accounts).await;
    let result = &second.report.network_results[0];
    assert!(result.outcomes.iter().all(|o| o.status == OutcomeStatus::Empty));
    assert_eq!(result.total_swept, U256::ZERO);
    assert_ne!(first.report.run_id, second.report.run_id);

    cleanup(&first);
    cleanup(&second);
}

#[tokio::test]
async fn test_reverted_transfer_is_failed() {
    let network = MockNetwork::new(1);
    network.set_receipt_mode(ReceiptMode::Revert);
    let acct = account(1, 0x01);
    network.set_balance(acct.address, 100);

    let connector = MockConnector::new();
    connector.add(1, network);

    let run = run_sweep(connector, settings(21), &[profile("Net", 1)], &[acct]).await;
    let result = &run.report.network_results[0];
    let outcome = &result.outcomes[0];

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Reverted));
    assert!(outcome.tx_hash.is_some());
    assert_eq!(outcome.amount, U256::from(79u64));
    // Only confirmed transfers count toward the total.
    assert_eq!(result.total_swept, U256::ZERO);
    assert_eq!(result.total_swept, result.recomputed_total());

    cleanup(&run);
}

#[tokio::test]
async fn test_stalled_confirmation_times_out() {
    let network = MockNetwork::new(1);
    network.set_receipt_mode(ReceiptMode::Never);
    let acct = account(1, 0x01);
    network.set_balance(acct.address, 100);

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let run = run_sweep(connector, settings(21), &[profile("Stuck", 1)], &[acct]).await;
    let outcome = &run.report.network_results[0].outcomes[0];

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Timeout));
    assert!(outcome.error.as_deref().unwrap_or("").contains("not confirmed"));
    assert!(outcome.tx_hash.is_some());
    assert_eq!(network.submitted().len(), 1);

    cleanup(&run);
}

#[tokio::test]
async fn test_missing_fee_data_uses_floor_price() {
    let network = MockNetwork::new(0);
    network.set_fee_parameters(FeeParameters::default());
    let acct = account(1, 0x01);
    let one_native = 1_000_000_000_000_000_000u128;
    network.set_balance(acct.address, one_native);

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let run = run_sweep(connector, settings(21_000), &[profile("Quiet", 1)], &[acct]).await;
    let outcome = &run.report.network_results[0].outcomes[0];

    // 20 gwei * 21000
    let floor_cost = 420_000_000_000_000u128;
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.fee_cost, Some(U256::from(floor_cost)));
    assert_eq!(outcome.amount, U256::from(one_native - floor_cost));
    assert_eq!(network.submitted()[0].request.gas_price, 20_000_000_000);

    cleanup(&run);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let network = MockNetwork::new(1);
    let acct = account(1, 0x01);
    network.set_balance(acct.address, 100);

    let connector = MockConnector::new();
    connector.add(1, network.clone());

    let shutdown = Shutdown::new();
    shutdown.trigger();
    let engine = SweepEngine::new(connector.clone(), settings(21), destination(), shutdown);

    let networks = vec![profile("A", 1), profile("B", 2)];
    let run = engine
        .run(&networks, &[acct], ReportStore::new(temp_dir()))
        .await
        .unwrap();

    assert_eq!(run.report.network_results.len(), 2);
    assert!(run
        .report
        .network_results
        .iter()
        .all(|n| n.status == NetworkStatus::Cancelled && n.outcomes.is_empty()));
    assert!(run.path.exists());
    assert_eq!(connector.connects(), 0);
    assert!(network.submitted().is_empty());

    cleanup(&run);
}

#[tokio::test]
async fn test_report_persisted_with_decimal_amounts() {
    let network = MockNetwork::new(1);
    let acct = account(7, 0x07);
    network.set_balance(acct.address, 100);

    let connector = MockConnector::new();
    connector.add(1, network);

    let run = run_sweep(connector, settings(21), &[profile("Net", 1)], &[acct]).await;

    let name = run.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("multi-network-sweep-") && name.ends_with(".json"));

    let loaded = load_report(&run.path).unwrap();
    assert_eq!(loaded, run.report);
    assert!(loaded.finished_at.is_some());

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&run.path).unwrap()).unwrap();
    let network_json = &raw["network_results"][0];
    assert_eq!(network_json["total_swept"], "79");
    assert_eq!(network_json["status"], "completed");
    assert_eq!(network_json["outcomes"][0]["wallet_id"], 7);
    assert_eq!(network_json["outcomes"][0]["amount"], "79");
    assert!(!raw.to_string().contains("not-a-real-key"));

    cleanup(&run);
}

#[tokio::test]
async fn test_parallel_and_sequential_runs_agree() {
    let build = || {
        let connector = MockConnector::new();
        let mut networks = Vec::new();
        for chain_id in 1..=4u64 {
            let network = MockNetwork::new(1);
            for byte in 1..=5u8 {
                network.set_balance(account(byte as u32, byte).address, 100 * byte as u128 * chain_id as u128);
            }
            connector.add(chain_id, network);
            networks.push(profile(&format!("Net{}", chain_id), chain_id));
        }
        (connector, networks)
    };
    let accounts: Vec<Account> = (1..=5u8).map(|b| account(b as u32, b)).collect();

    let (seq_connector, networks) = build();
    let sequential = SweepConfig {
        max_concurrent_networks: 1,
        max_concurrent_accounts: 1,
        ..settings(21)
    };
    let seq = run_sweep(seq_connector, sequential, &networks, &accounts).await;

    let (par_connector, networks) = build();
    let parallel = SweepConfig {
        max_concurrent_networks: 4,
        max_concurrent_accounts: 5,
        ..settings(21)
    };
    let par = run_sweep(par_connector, parallel, &networks, &accounts).await;

    for (s, p) in seq.report.network_results.iter().zip(&par.report.network_results) {
        assert_eq!(s.network_name, p.network_name);
        assert_eq!(s.total_swept, p.total_swept);
        let s_ids: Vec<u32> = s.outcomes.iter().map(|o| o.wallet_id).collect();
        let p_ids: Vec<u32> = p.outcomes.iter().map(|o| o.wallet_id).collect();
        assert_eq!(s_ids, p_ids);
        assert_eq!(s.total_swept, s.recomputed_total());
    }

    cleanup(&seq);
    cleanup(&par);
}

#[tokio::test]
async fn test_preconditions_fail_before_any_network() {
    let connector = MockConnector::new();
    let engine = SweepEngine::new(connector.clone(), settings(21), destination(), Shutdown::new());
    let networks = vec![profile("Net", 1)];

    let no_accounts = engine.run(&networks, &[], ReportStore::new(temp_dir())).await;
    assert!(matches!(no_accounts, Err(SweepError::NoAccounts)));

    let no_networks = engine.run(&[], &[account(1, 1)], ReportStore::new(temp_dir())).await;
    assert!(matches!(no_networks, Err(SweepError::NoNetworks)));

    let blocker = temp_dir();
    std::fs::write(&blocker, "file").unwrap();
    let unwritable = engine
        .run(&networks, &[account(1, 1)], ReportStore::new(blocker.join("reports")))
        .await;
    assert!(matches!(unwritable, Err(SweepError::Report(_))));
    std::fs::remove_file(&blocker).unwrap_or_default();

    assert_eq!(connector.connects(), 0);
}

#[tokio::test]
async fn test_balance_survey_moves_nothing() {
    let network = MockNetwork::new(1);
    let accounts = vec![account(1, 0x01), account(2, 0x02)];
    network.set_balance(accounts[0].address, 100);

    let connector = MockConnector::new();
    connector.add(1, network.clone());
    connector.set_unreachable(2);

    let networks = vec![profile("Up", 1), profile("Down", 2)];
    let surveys = survey_balances(connector.as_ref(), &networks, &accounts, 2).await;

    assert_eq!(surveys.len(), 2);
    assert_eq!(surveys[0].funded(), 1);
    assert_eq!(surveys[0].balances[0].balance, Ok(U256::from(100u64)));
    assert!(surveys[1].connection_error.is_some());
    assert!(network.submitted().is_empty());
}
