use futures::StreamExt;
use futures::stream;
use std::future::Future;

/// 以有限并发度执行一组任务，结果顺序与输入顺序一致（与完成先后无关）
pub async fn do_parallel_with_limit<F, T>(futures: Vec<F>, max_concurrent: usize) -> Vec<T>
where
    F: Future<Output = T>,
{
    stream::iter(futures)
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}
