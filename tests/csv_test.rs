mod common;

use anyhow::Result;
use common::{SampleMonth, reopen, spend, test_service};
use pitaka::domain::{SpendType, parse_cents};
use pitaka::io::{ImportOptions, Importer, to_csv};

#[tokio::test]
async fn test_exported_csv_reparses_to_same_records() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    SampleMonth::create(&mut service).await?;
    spend(&mut service, "2024-01-18", "Food", SpendType::Wants, 5, "tip \"extra\", thanks").await?;

    let csv_text = to_csv(service.ledger().records());
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());

    assert_eq!(
        reader.headers()?.iter().collect::<Vec<_>>(),
        vec!["Date", "Category", "Type", "Amount", "Notes"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    // Exported oldest first, stored newest first
    let stored: Vec<_> = service.ledger().records().iter().rev().collect();
    assert_eq!(rows.len(), stored.len());

    for (row, record) in rows.iter().zip(stored) {
        assert_eq!(&row[0], record.date.to_string());
        assert_eq!(&row[1], record.category);
        assert_eq!(&row[2], record.spend_type.as_str());
        assert_eq!(parse_cents(&row[3])?, record.amount_cents);
        assert_eq!(&row[4], record.notes);
    }

    Ok(())
}

#[tokio::test]
async fn test_import_restores_exported_ledger() -> Result<()> {
    let (mut source, _temp) = test_service().await?;
    SampleMonth::create(&mut source).await?;
    let csv_text = to_csv(source.ledger().records());

    let (mut target, _temp2) = test_service().await?;
    let result = Importer::new(&mut target)
        .import_csv(csv_text.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 10);
    assert!(result.errors.is_empty());

    let restored = target.ledger().records();
    let original = source.ledger().records();
    assert_eq!(restored.len(), original.len());
    for (a, b) in restored.iter().zip(original) {
        // Fresh ids, same content and order
        assert_ne!(a.id, b.id);
        assert_eq!(
            (a.date, &a.category, a.spend_type, a.amount_cents, &a.notes),
            (b.date, &b.category, b.spend_type, b.amount_cents, &b.notes)
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_import_reports_bad_rows() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    let csv_text = "Date,Category,Type,Amount,Notes\n\
                    2024-01-01,\"Food\",Needs,100,\"ok\"\n\
                    2024-13-01,\"Food\",Needs,100,\"bad date\"\n\
                    2024-01-02,\"\",Needs,100,\"no category\"\n\
                    2024-01-03,\"Food\",Needs,0,\"zero\"\n\
                    2024-01-04,\"Food\",Splurge,10,\"bad type\"\n\
                    2024-01-05,\"Bills\",Needs,2500.75,\"\"";

    let result = Importer::new(&mut service)
        .import_csv(csv_text.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    let failed_lines: Vec<_> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(failed_lines, vec![3, 4, 5, 6]);

    assert_eq!(service.ledger().len(), 2);
    assert_eq!(service.ledger().records()[0].amount_cents, 250075);

    // The batch was persisted
    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.ledger().records(), service.ledger().records());

    Ok(())
}

#[tokio::test]
async fn test_dry_run_does_not_modify_ledger() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    let csv_text = "Date,Category,Type,Amount,Notes\n2024-01-01,\"Food\",Needs,100,\"\"";

    let result = Importer::new(&mut service)
        .import_csv(csv_text.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 1);
    assert!(service.ledger().is_empty());

    Ok(())
}
