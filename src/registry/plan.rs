//! The built-in study plan

use super::{Day, Topic};

pub(super) static DAYS: &[Day] = &[
    Day {
        id: 1,
        title: "Backend & Data",
        subtitle: "API design, schemas and storage",
        total_time: "6-7h",
        color: "blue",
        icon: "⚙",
        topics: &[
            Topic {
                id: "1-1",
                title: "FastAPI Service Design",
                file: "day1/fastapi-service-design.md",
                duration: "2h",
                description: "Resource layout, request validation and async handlers for an experiment tracking API",
                tags: &["python", "fastapi", "api"],
            },
            Topic {
                id: "1-2",
                title: "PostgreSQL Schema Design",
                file: "day1/postgresql-schema.md",
                duration: "2h",
                description: "Experiments, runs and metrics tables, indexing and JSONB trade-offs",
                tags: &["postgresql", "sql", "schema"],
            },
            Topic {
                id: "1-3",
                title: "Caching & Message Queues",
                file: "day1/caching-and-queues.md",
                duration: "1-2h",
                description: "Read-through caches, invalidation and background metric ingestion",
                tags: &["redis", "queues", "performance"],
            },
        ],
    },
    Day {
        id: 2,
        title: "Frontend",
        subtitle: "React patterns and data fetching",
        total_time: "4-5h",
        color: "green",
        icon: "◧",
        topics: &[
            Topic {
                id: "2-1",
                title: "React Component Patterns",
                file: "day2/react-patterns.md",
                duration: "2h",
                description: "Composition, controlled inputs, lifting state and memoisation",
                tags: &["react", "typescript"],
            },
            Topic {
                id: "2-2",
                title: "State & Data Fetching",
                file: "day2/state-and-fetching.md",
                duration: "1-2h",
                description: "Server state caching, optimistic updates and polling run metrics",
                tags: &["react", "state", "api"],
            },
            Topic {
                id: "2-3",
                title: "Charts for Training Curves",
                file: "day2/training-charts.md",
                duration: "1h",
                description: "Rendering large metric series, downsampling and comparison views",
                tags: &["visualization", "performance"],
            },
        ],
    },
    Day {
        id: 3,
        title: "Infrastructure",
        subtitle: "Kubernetes and Linux operations",
        total_time: "5-6h",
        color: "purple",
        icon: "☸",
        topics: &[
            Topic {
                id: "3-1",
                title: "Infrastructure Components",
                file: "day3/infrastructure-components.md",
                duration: "1-2h",
                description: "Load balancers, object storage, databases and how they fit together",
                tags: &["architecture", "infrastructure"],
            },
            Topic {
                id: "3-2",
                title: "Kubernetes Deployment",
                file: "day3/kubernetes-deployment.md",
                duration: "2h",
                description: "Deployments, services, config maps, probes and rolling updates",
                tags: &["kubernetes", "devops"],
            },
            Topic {
                id: "3-3",
                title: "Linux Operations",
                file: "day3/linux-operations.md",
                duration: "1-2h",
                description: "Processes, file descriptors, disk usage and debugging a slow host",
                tags: &["linux", "debugging"],
            },
        ],
    },
    Day {
        id: 4,
        title: "HPC & ML",
        subtitle: "SLURM integration and ML fundamentals",
        total_time: "4-5h",
        color: "orange",
        icon: "∑",
        topics: &[
            Topic {
                id: "4-1",
                title: "SLURM Integration",
                file: "day4/slurm-integration.md",
                duration: "2h",
                description: "Batch scripts, job arrays and reporting run status from cluster jobs",
                tags: &["hpc", "slurm"],
            },
            Topic {
                id: "4-2",
                title: "ML Fundamentals",
                file: "day4/ml-fundamentals.md",
                duration: "2-3h",
                description: "Loss curves, overfitting, hyperparameter sweeps and what to log",
                tags: &["ml", "training"],
            },
        ],
    },
    Day {
        id: 5,
        title: "Review",
        subtitle: "Talking points and cheat sheet",
        total_time: "2h",
        color: "red",
        icon: "✓",
        topics: &[
            Topic {
                id: "5-1",
                title: "Cheat Sheet",
                file: "review/cheat-sheet.md",
                duration: "1h",
                description: "One-page summary of numbers, commands and design trade-offs",
                tags: &["review"],
            },
            Topic {
                id: "5-2",
                title: "System Design Walkthrough",
                file: "review/system-design-walkthrough.md",
                duration: "1h",
                description: "End-to-end talk track for designing an experiment tracker",
                tags: &["review", "architecture"],
            },
        ],
    },
];
