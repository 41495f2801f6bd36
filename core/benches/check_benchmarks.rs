use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use checkflow::clients::multipart::encode_related_with_boundary;
use checkflow::{
  Attachment, CheckError, CheckRecord, ContextData, Pipeline, PipelineControl, ProcessedCheck,
};
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

fn sample_doc() -> ProcessedCheck {
  let mut record = CheckRecord::parse("acct42^19.99").unwrap();
  record.merge_ocr("acct7".to_string(), "rt001".to_string());
  record.to_document().unwrap()
}

fn bench_trigger_parse(c: &mut Criterion) {
  c.bench_function("trigger_parse", |b| {
    b.iter(|| CheckRecord::parse("acct42^19.99").unwrap())
  });
}

fn bench_multipart_encode(c: &mut Criterion) {
  let doc = sample_doc();
  let mut group = c.benchmark_group("multipart_encode");
  for size in [1_024usize, 65_536] {
    let data = vec![0u8; size];
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
      let attachment = Attachment {
        name: "acct42^19.99",
        content_type: "image/jpeg",
        data,
      };
      b.iter(|| encode_related_with_boundary(&doc, &attachment, "benchboundary").unwrap())
    });
  }
  group.finish();
}

fn bench_pipeline_dispatch(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();

  let mut pipeline = Pipeline::<BenchContext, CheckError>::new(&["a", "b", "c", "d", "e"]);
  for step in ["a", "b", "c", "d", "e"] {
    pipeline.on(step, |ctx: ContextData<BenchContext>| async move {
      ctx.write().counter += 1;
      Ok::<_, CheckError>(PipelineControl::Continue)
    });
  }

  c.bench_function("pipeline_dispatch_5_steps", |b| {
    b.to_async(&rt).iter(|| {
      let ctx = ContextData::new(BenchContext::default());
      let pipeline = &pipeline;
      async move { pipeline.run(ctx).await.unwrap() }
    })
  });
}

criterion_group!(
  benches,
  bench_trigger_parse,
  bench_multipart_encode,
  bench_pipeline_dispatch
);
criterion_main!(benches);
