//! Fixed connector templates, one per supported database backend.
//!
//! Templates only emit text. Nothing here opens a connection; the generated
//! server does that when it starts.

use crate::model::DatabaseType;

pub struct DatabaseTemplate {
    /// npm package the connector requires
    pub package: &'static str,
    /// Variables read by the connector, written empty to `.env`
    pub env_vars: &'static [&'static str],
    /// Client construction plus a connection check that logs the outcome
    pub connector: &'static str,
}

pub fn template(db_type: DatabaseType) -> &'static DatabaseTemplate {
    match db_type {
        DatabaseType::Mysql => &MYSQL,
        DatabaseType::Oracle => &ORACLE,
        DatabaseType::Postgresql => &POSTGRESQL,
        DatabaseType::Mssql => &MSSQL,
        DatabaseType::Mongodb => &MONGODB,
        DatabaseType::Redis => &REDIS,
    }
}

static MYSQL: DatabaseTemplate = DatabaseTemplate {
    package: "mysql2",
    env_vars: &["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME", "DB_PORT"],
    connector: r#"// MySQL connection
const mysql = require('mysql2/promise');

const pool = mysql.createPool({
  host: process.env.DB_HOST,
  user: process.env.DB_USER,
  password: process.env.DB_PASSWORD,
  database: process.env.DB_NAME,
  port: process.env.DB_PORT,
  waitForConnections: true,
  connectionLimit: 10,
});

pool.getConnection()
  .then((connection) => {
    console.log('Connected to MySQL');
    connection.release();
  })
  .catch((err) => {
    console.error('MySQL connection error:', err.message);
  });
"#,
};

static ORACLE: DatabaseTemplate = DatabaseTemplate {
    package: "oracledb",
    env_vars: &["ORACLE_USER", "ORACLE_PASSWORD", "ORACLE_CONNECT_STRING"],
    connector: r#"// Oracle connection
const oracledb = require('oracledb');

let pool;

async function initOracle() {
  try {
    pool = await oracledb.createPool({
      user: process.env.ORACLE_USER,
      password: process.env.ORACLE_PASSWORD,
      connectString: process.env.ORACLE_CONNECT_STRING,
    });
    console.log('Connected to Oracle');
  } catch (err) {
    console.error('Oracle connection error:', err.message);
  }
}

initOracle();
"#,
};

static POSTGRESQL: DatabaseTemplate = DatabaseTemplate {
    package: "pg",
    env_vars: &["PG_HOST", "PG_USER", "PG_PASSWORD", "PG_DATABASE", "PG_PORT"],
    connector: r#"// PostgreSQL connection
const { Pool } = require('pg');

const pool = new Pool({
  host: process.env.PG_HOST,
  user: process.env.PG_USER,
  password: process.env.PG_PASSWORD,
  database: process.env.PG_DATABASE,
  port: process.env.PG_PORT,
});

pool.query('SELECT NOW()')
  .then(() => console.log('Connected to PostgreSQL'))
  .catch((err) => console.error('PostgreSQL connection error:', err.message));
"#,
};

static MSSQL: DatabaseTemplate = DatabaseTemplate {
    package: "mssql",
    env_vars: &[
        "MSSQL_SERVER",
        "MSSQL_USER",
        "MSSQL_PASSWORD",
        "MSSQL_DATABASE",
        "MSSQL_PORT",
    ],
    connector: r#"// SQL Server connection
const sql = require('mssql');

const sqlConfig = {
  server: process.env.MSSQL_SERVER,
  user: process.env.MSSQL_USER,
  password: process.env.MSSQL_PASSWORD,
  database: process.env.MSSQL_DATABASE,
  port: parseInt(process.env.MSSQL_PORT, 10) || 1433,
  options: {
    encrypt: true,
    trustServerCertificate: true,
  },
};

const poolPromise = sql.connect(sqlConfig)
  .then((pool) => {
    console.log('Connected to SQL Server');
    return pool;
  })
  .catch((err) => {
    console.error('SQL Server connection error:', err.message);
  });
"#,
};

static MONGODB: DatabaseTemplate = DatabaseTemplate {
    package: "mongodb",
    env_vars: &["MONGODB_URI", "MONGODB_DB"],
    connector: r#"// MongoDB connection
const { MongoClient } = require('mongodb');

const mongoClient = new MongoClient(process.env.MONGODB_URI);
let db;

mongoClient.connect()
  .then(() => {
    db = mongoClient.db(process.env.MONGODB_DB);
    console.log('Connected to MongoDB');
  })
  .catch((err) => {
    console.error('MongoDB connection error:', err.message);
  });
"#,
};

static REDIS: DatabaseTemplate = DatabaseTemplate {
    package: "redis",
    env_vars: &["REDIS_HOST", "REDIS_PORT", "REDIS_PASSWORD"],
    connector: r#"// Redis connection
const { createClient } = require('redis');

const redisClient = createClient({
  socket: {
    host: process.env.REDIS_HOST,
    port: process.env.REDIS_PORT,
  },
  password: process.env.REDIS_PASSWORD,
});

redisClient.on('error', (err) => console.error('Redis client error:', err.message));

redisClient.connect()
  .then(() => console.log('Connected to Redis'))
  .catch((err) => console.error('Redis connection error:', err.message));
"#,
};
