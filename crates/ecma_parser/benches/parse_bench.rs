use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecma_parser::{parse, Plugin, ParserOptions, SourceType};

// A medium-size module (~80 lines) with classes, closures and destructuring
const JAVASCRIPT_SOURCE: &str = r#"
import { EventEmitter } from "events";

const DEFAULTS = { retries: 3, timeout: 1000, verbose: false };

export class Queue extends EventEmitter {
    #items = [];

    constructor(options = {}) {
        super();
        this.options = { ...DEFAULTS, ...options };
    }

    get size() {
        return this.#items.length;
    }

    push(item, priority = 0) {
        const index = this.#items.findIndex((entry) => entry.priority < priority);
        if (index === -1) {
            this.#items.push({ item, priority });
        } else {
            this.#items.splice(index, 0, { item, priority });
        }
        this.emit("push", item);
        return this;
    }

    async *drain() {
        while (this.#items.length > 0) {
            const { item } = this.#items.shift();
            yield await Promise.resolve(item);
        }
    }
}

export function retry(fn, { retries, timeout } = DEFAULTS) {
    return async function attempt(...args) {
        for (let i = 0; i <= retries; i++) {
            try {
                return await fn(...args);
            } catch (err) {
                if (i === retries) throw err;
                await new Promise((resolve) => setTimeout(resolve, timeout * 2 ** i));
            }
        }
    };
}

const pattern = /^(\d+)-(\w+)$/giu;
const label = (n) => `item ${n > 1 ? "many" : "one"}: ${n}`;

export default {
    parse(text) {
        const [, id, name] = pattern.exec(text) ?? [];
        return id && name ? { id: Number(id), name } : null;
    },
    label,
};
"#;

// The same shape with Flow annotations
const FLOW_SOURCE: &str = r#"
type Entry<T> = {| item: T, priority: number |};

export class Queue<T> {
    items: Array<Entry<T>> = [];

    push(item: T, priority?: number = 0): this {
        const index = this.items.findIndex((entry: Entry<T>): boolean => entry.priority < priority);
        this.items.splice(index === -1 ? this.items.length : index, 0, { item, priority });
        return this;
    }

    pop(): ?T {
        const entry = this.items.shift();
        return entry ? entry.item : null;
    }
}

declare function retry<R>(fn: (...args: Array<mixed>) => Promise<R>, retries?: number): Promise<R>;
"#;

fn bench_parse_module(c: &mut Criterion) {
    let options = ParserOptions::default()
        .with_source_type(SourceType::Module)
        .with_plugins([Plugin::ClassPrivateProperties, Plugin::NullishCoalescingOperator]);
    c.bench_function("parse_module_medium", |b| {
        b.iter(|| black_box(parse(black_box(JAVASCRIPT_SOURCE), options.clone())));
    });
}

fn bench_parse_flow(c: &mut Criterion) {
    let options = ParserOptions::default()
        .with_source_type(SourceType::Module)
        .with_plugins([Plugin::Flow, Plugin::ClassProperties]);
    c.bench_function("parse_flow_medium", |b| {
        b.iter(|| black_box(parse(black_box(FLOW_SOURCE), options.clone())));
    });
}

criterion_group!(benches, bench_parse_module, bench_parse_flow);
criterion_main!(benches);
