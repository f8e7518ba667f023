//
// Copyright 2026 The atmodem Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use atmodem_codec::{LineParser, Segments};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn parser_benchmark(c: &mut Criterion) {
    let line = b"ATE1V1;+CMEE=2;+CUSD=1,\"*100#\",15;S3?\r";
    c.bench_function("parse_command_line", |b| {
        b.iter(|| {
            let mut parser = LineParser::new();
            for byte in line {
                black_box(parser.feed(*byte));
            }
        });
    });
}

fn splitter_benchmark(c: &mut Criterion) {
    let line = "E1V1;+CMEE=2;+CUSD=1,\"*100#\",15;S3?";
    c.bench_function("split_command_line", |b| {
        b.iter(|| {
            for segment in Segments::new(black_box(line)) {
                black_box(segment);
            }
        });
    });
}

criterion_group!(benches, parser_benchmark, splitter_benchmark);
criterion_main!(benches);
