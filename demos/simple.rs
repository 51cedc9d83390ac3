use intercast::{BufferedChannel, CurrentValueSubject, SignalSubject, Subscription};

async fn sum_worker(
    name: &'static str,
    jobs: BufferedChannel<(i32, i32)>,
    results: BufferedChannel<i32>,
    mut close: Subscription<()>,
) {
    loop {
        tokio::select! {
            _ = close.recv() => {
                println!("{}: closed", name);
                return;
            }
            job = jobs.recv() => match job {
                Some((a, b)) => {
                    println!("{}: {} + {} = {}", name, a, b, a + b);
                    results.send(a + b);
                }
                None => return,
            }
        }
    }
}

async fn progress_listener(mut progress: Subscription<i32>) {
    while let Some(total) = progress.recv().await {
        println!("total so far: {}", total);
    }
}

#[tokio::main]
async fn main() {
    let jobs = BufferedChannel::new();
    let results = BufferedChannel::new();
    let total = CurrentValueSubject::new(0);
    let close = SignalSubject::new();

    let listener = tokio::spawn(progress_listener(total.subscribe()));
    let workers = [
        tokio::spawn(sum_worker(
            "first",
            jobs.clone(),
            results.clone(),
            close.subscribe(),
        )),
        tokio::spawn(sum_worker(
            "second",
            jobs.clone(),
            results.clone(),
            close.subscribe(),
        )),
    ];

    for i in 1..=5 {
        jobs.send((i, i * 10));
    }

    for _ in 1..=5 {
        if let Some(sum) = results.recv().await {
            total.send(total.value() + sum);
        }
    }

    close.signal();
    for worker in workers {
        worker.await.expect("worker panicked");
    }

    let sum = total.value();
    total.finish();
    listener.await.expect("listener panicked");
    println!("total: {}", sum);
}
