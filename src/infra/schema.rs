pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS tickets (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  description TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS analysis_runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  created_at TEXT NOT NULL,
  summary TEXT
);

CREATE TABLE IF NOT EXISTS ticket_analysis (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  analysis_run_id INTEGER NOT NULL REFERENCES analysis_runs(id),
  ticket_id INTEGER NOT NULL REFERENCES tickets(id),
  category TEXT NOT NULL,
  priority TEXT NOT NULL,
  notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_ticket_analysis_run ON ticket_analysis(analysis_run_id);
"#;
