use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

/// Caller-provided destination for a remote command's output stream.
pub type OutputSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Copy `rd` into `sink` until EOF; resolves to the number of bytes copied.
pub(crate) fn spawn_pump<R>(
    mut rd: R,
    mut sink: OutputSink,
    label: &'static str,
) -> JoinHandle<std::io::Result<u64>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;

        loop {
            let n = rd.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n]).await?;
            total += n as u64;
        }

        sink.flush().await?;
        tracing::trace!(stream = label, bytes = total, "remote output drained");
        Ok(total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_until_eof() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let (sink, mut out) = tokio::io::duplex(1024);

        let task = spawn_pump(rd, Box::new(sink), "stdout");
        wr.write_all(b"hello\nworld").await.unwrap();
        drop(wr);

        assert_eq!(task.await.unwrap().unwrap(), 11);
        let mut collected = String::new();
        out.read_to_string(&mut collected).await.unwrap();
        assert_eq!(collected, "hello\nworld");
    }
}
