use core::{future::Future, time::Duration};

use super::{SleepProvider, TokioSleep};
use crate::{Poll, Result, SleetId, SnowflakeGenerator, TimeSource};

/// Extension trait for asynchronously generating IDs.
///
/// Instead of spinning while the current millisecond is exhausted, the
/// returned future polls [`SnowflakeGenerator::try_poll_id`] and awaits the
/// [`SleepProvider`] between attempts. The resume condition is unchanged: a
/// new ID is issued once the clock reads past the exhausted millisecond.
pub trait SnowflakeGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID, backing off
    /// with `S` whenever the generator is not ready.
    ///
    /// # Errors
    ///
    /// Resolves to an error if the generator fails (clock rollback, clock
    /// before epoch, poisoned lock). Errors are not retried.
    fn next_id_async_with<S>(&self) -> impl Future<Output = Result<SleetId>> + Send
    where
        S: SleepProvider;

    /// Same as [`Self::next_id_async_with`] using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// See [`Self::next_id_async_with`].
    ///
    /// # Example
    /// ```
    /// use sleet::{SnowflakeGenerator, SnowflakeGeneratorAsyncExt};
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
    /// let generator = SnowflakeGenerator::new(0, 1)?;
    /// let id = generator.next_id_async().await?;
    /// assert_eq!(id.machine_id(), 1);
    /// # Ok::<(), sleet::Error>(())
    /// # }).unwrap();
    /// ```
    fn next_id_async(&self) -> impl Future<Output = Result<SleetId>> + Send {
        self.next_id_async_with::<TokioSleep>()
    }
}

impl<T> SnowflakeGeneratorAsyncExt for SnowflakeGenerator<T>
where
    T: TimeSource + Sync,
{
    fn next_id_async_with<S>(&self) -> impl Future<Output = Result<SleetId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    };

    use futures::future::try_join_all;

    use super::*;
    use crate::{
        Error, GeneratorConfig, MonotonicClock, SystemClock,
        futures::{TokioSleep, TokioYield},
    };

    const NUM_TASKS: usize = 8;
    const IDS_PER_TASK: usize = 4096 * 4;

    struct ManualClock(AtomicU64);

    impl TimeSource for ManualClock {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn can_call_next_id_async() {
        let generator = SnowflakeGenerator::new(2, 3).unwrap();
        let id = generator.next_id_async().await.unwrap();
        assert_eq!(id.datacenter_id(), 2);
        assert_eq!(id.machine_id(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_sleep() -> Result<()> {
        many_unique_ids::<TokioSleep>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_yield() -> Result<()> {
        many_unique_ids::<TokioYield>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn waits_for_clock_after_exhaustion() {
        let clock = Arc::new(ManualClock(AtomicU64::new(5_000)));
        let config = GeneratorConfig::new(0, 0)
            .unwrap()
            .with_epoch(Duration::from_millis(1_000));
        let generator = Arc::new(SnowflakeGenerator::from_config(config, Arc::clone(&clock)));

        for _ in 0..=SleetId::SEQUENCE_MASK {
            generator.next_id_async().await.unwrap();
        }

        let waiter = {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move { generator.next_id_async_with::<TokioYield>().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        clock.0.store(5_001, Ordering::SeqCst);
        let id = waiter.await.unwrap().unwrap();
        assert_eq!(id.millis_offset(), 4_001);
        assert_eq!(id.sequence(), 0);
    }

    #[tokio::test]
    async fn rollback_is_not_retried() {
        let clock = Arc::new(ManualClock(AtomicU64::new(5_000)));
        let config = GeneratorConfig::default().with_epoch(Duration::ZERO);
        let generator = SnowflakeGenerator::from_config(config, Arc::clone(&clock));

        generator.next_id_async().await.unwrap();
        clock.0.store(4_000, Ordering::SeqCst);
        assert_eq!(
            generator.next_id_async().await,
            Err(Error::ClockRolledBack {
                last_millis: 5_000,
                now: 4_000
            })
        );
    }

    async fn many_unique_ids<S>() -> Result<()>
    where
        S: SleepProvider + 'static,
    {
        let generator = Arc::new(SnowflakeGenerator::from_config(
            GeneratorConfig::new(1, 1)?,
            MonotonicClock::default(),
        ));

        let tasks: Vec<_> = (0..NUM_TASKS)
            .map(|_| {
                let generator = Arc::clone(&generator);
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(IDS_PER_TASK);
                    for _ in 0..IDS_PER_TASK {
                        ids.push(generator.next_id_async_with::<S>().await?);
                    }
                    Ok::<_, Error>(ids)
                })
            })
            .collect();

        let mut seen = HashSet::with_capacity(NUM_TASKS * IDS_PER_TASK);
        for ids in try_join_all(tasks).await.unwrap() {
            for id in ids? {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), NUM_TASKS * IDS_PER_TASK);

        // A second, independent instance never overlaps the first.
        let other = SnowflakeGenerator::from_config(GeneratorConfig::new(1, 2)?, SystemClock);
        let id = other.next_id_async_with::<S>().await?;
        assert!(!seen.contains(&id));
        Ok(())
    }
}
