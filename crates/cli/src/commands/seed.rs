use crate::commands::{prepare, CommandResult};
use cartlens_db::{connect_with_config, migrations, DemoDataset, SeedResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result = if verification.all_present {
            Ok(seed_result)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", seed_message(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(seeded: &SeedResult) -> String {
    format!(
        "demo orders loaded: {} categories, {} services, {} order lines",
        seeded.categories, seeded.services, seeded.order_lines
    )
}

fn verification_failure_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_message, verification_failure_message};
    use cartlens_db::SeedResult;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("categories", true), ("services", false), ("orphan-line-unresolved", false)];

        assert_eq!(
            verification_failure_message(&checks),
            "Seed verification failed for checks: services, orphan-line-unresolved"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("categories", true), ("order-lines", true)];
        assert_eq!(verification_failure_message(&checks), "Some seed data failed to load");
    }

    #[test]
    fn seed_message_lists_row_counts() {
        let seeded = SeedResult { categories: 3, services: 5, order_lines: 12 };
        assert_eq!(
            seed_message(&seeded),
            "demo orders loaded: 3 categories, 5 services, 12 order lines"
        );
    }
}
